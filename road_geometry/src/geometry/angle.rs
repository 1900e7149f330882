//! Angle conventions and the rotation/side enumerations.
//!
//! All angles in this crate are math angles: radians, counter-clockwise from
//! the +X axis. Azimuths (clockwise from north) are only converted at the
//! boundary.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::str::FromStr;

use crate::error::GeometryError;

/// Converts an azimuth (radians, clockwise from north) to a math angle.
pub fn azimuth_to_angle(azimuth: f64) -> f64 {
    normalize_angle_positive(FRAC_PI_2 - azimuth)
}

/// Converts a math angle to an azimuth (radians, clockwise from north).
pub fn angle_to_azimuth(angle: f64) -> f64 {
    normalize_angle_positive(FRAC_PI_2 - angle)
}

/// Wraps an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a > PI {
        a - TAU
    } else {
        a
    }
}

/// Wraps an angle into `[0, 2*PI)`.
pub fn normalize_angle_positive(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Turning direction of a curve or spiral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    /// Clockwise, turning right.
    Cw,
    /// Counter-clockwise, turning left.
    Ccw,
}

impl Rotation {
    /// +1 for counter-clockwise, -1 for clockwise.
    pub fn sign(self) -> f64 {
        match self {
            Rotation::Ccw => 1.0,
            Rotation::Cw => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rotation::Cw => "cw",
            Rotation::Ccw => "ccw",
        }
    }
}

impl FromStr for Rotation {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cw" => Ok(Rotation::Cw),
            "ccw" => Ok(Rotation::Ccw),
            other => Err(GeometryError::invalid(
                "rot",
                format!("expected 'cw' or 'ccw', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of an alignment, looking in the direction of increasing station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl FromStr for Side {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(GeometryError::invalid(
                "side",
                format!("expected 'left' or 'right', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn azimuth_conversion() {
        // North is +Y, east is +X.
        assert!((azimuth_to_angle(0.0) - FRAC_PI_2).abs() < 1e-12);
        assert!(azimuth_to_angle(FRAC_PI_2).abs() < 1e-12);
        let a = 1.234;
        assert!((azimuth_to_angle(angle_to_azimuth(a)) - a).abs() < 1e-12);
    }

    #[test]
    fn normalization() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-12);
        assert!((normalize_angle_positive(-FRAC_PI_2) - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn parse_enums() {
        assert_eq!("ccw".parse::<Rotation>().unwrap(), Rotation::Ccw);
        assert!("clockwise".parse::<Rotation>().is_err());
        assert_eq!("Right".parse::<Side>().unwrap(), Side::Right);
        assert!("up".parse::<Side>().is_err());
        assert_eq!(Rotation::Cw.sign(), -1.0);
    }
}
