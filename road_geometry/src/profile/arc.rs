//! Circular vertical curves.
//!
//! Elevations and grades use the parabolic approximation of the arc, which
//! is indistinguishable from the true circle for road grades.

use serde::{Deserialize, Serialize};

use super::{check_station, Pvi, VerticalGeometry};
use crate::error::{GeometryError, Result};

/// Deflections below this are treated as a straight grade.
const MIN_DEFLECTION: f64 = 1e-10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcData {
    pub pvi: Pvi,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    pub grade_in: f64,
    pub grade_out: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// Circular vertical curve centred on its PVI.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pvi: Pvi,
    length: f64,
    /// Infinite when the grades do not change.
    radius: f64,
    grade_in: f64,
    grade_out: f64,
    grade_change: f64,
    sta_start: f64,
    sta_end: f64,
    elev_bvc: f64,
    elev_evc: f64,
    desc: Option<String>,
}

impl Arc {
    pub fn new(data: ArcData) -> Result<Self> {
        let deflection = (data.grade_out.atan() - data.grade_in.atan()).abs();
        let (length, radius) = match (data.length, data.radius) {
            (Some(length), Some(radius)) => (length, radius),
            (Some(length), None) if deflection < MIN_DEFLECTION => (length, f64::INFINITY),
            (Some(length), None) => (length, length / deflection),
            (None, Some(radius)) if deflection < MIN_DEFLECTION => (0.0, radius),
            (None, Some(radius)) => (radius * deflection, radius),
            (None, None) => return Err(GeometryError::missing("CircCurve", "length")),
        };
        if length < 0.0 {
            return Err(GeometryError::NegativeLength(length));
        }
        if radius <= 0.0 {
            return Err(GeometryError::invalid(
                "radius",
                format!("radius must be positive, got {radius}"),
            ));
        }

        let half = length / 2.0;
        log::debug!("vertical arc at {}: L={length:.3} R={radius:.3}", data.pvi.station);
        Ok(Self {
            pvi: data.pvi,
            length,
            radius,
            grade_in: data.grade_in,
            grade_out: data.grade_out,
            grade_change: data.grade_out - data.grade_in,
            sta_start: data.pvi.station - half,
            sta_end: data.pvi.station + half,
            elev_bvc: data.pvi.elevation - half * data.grade_in,
            elev_evc: data.pvi.elevation + half * data.grade_out,
            desc: data.desc,
        })
    }

    pub fn pvi(&self) -> Pvi {
        self.pvi
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn grade_in(&self) -> f64 {
        self.grade_in
    }

    pub fn grade_out(&self) -> f64 {
        self.grade_out
    }

    pub fn grade_change(&self) -> f64 {
        self.grade_change
    }

    pub fn elev_bvc(&self) -> f64 {
        self.elev_bvc
    }

    pub fn elev_evc(&self) -> f64 {
        self.elev_evc
    }

    pub fn to_data(&self) -> ArcData {
        ArcData {
            pvi: self.pvi,
            length: Some(self.length),
            radius: Some(self.radius),
            grade_in: self.grade_in,
            grade_out: self.grade_out,
            desc: self.desc.clone(),
        }
    }

    /// Rate of grade change per unit station; zero for a degenerate arc.
    fn grade_rate(&self) -> f64 {
        if self.length > 0.0 {
            self.grade_change / self.length
        } else {
            0.0
        }
    }
}

impl VerticalGeometry for Arc {
    fn station_range(&self) -> (f64, f64) {
        (self.sta_start, self.sta_end)
    }

    fn elevation_at_station(&self, station: f64) -> Result<f64> {
        check_station(station, self.station_range())?;
        let x = station - self.sta_start;
        Ok(self.elev_bvc + self.grade_in * x + self.grade_rate() * x * x / 2.0)
    }

    fn grade_at_station(&self, station: f64) -> Result<f64> {
        check_station(station, self.station_range())?;
        let x = station - self.sta_start;
        Ok(self.grade_in + self.grade_rate() * x)
    }
}
