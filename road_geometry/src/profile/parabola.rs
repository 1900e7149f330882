//! Parabolic vertical curves, symmetric or asymmetric about the PVI.

use serde::{Deserialize, Serialize};

use super::{check_station, Pvi, VerticalGeometry};
use crate::error::{GeometryError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParabolaData {
    pub pvi: Pvi,
    pub length: f64,
    /// Length before the PVI; the curve is asymmetric when either side is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_out: Option<f64>,
    pub grade_in: f64,
    pub grade_out: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parabola {
    pvi: Pvi,
    length: f64,
    length_in: f64,
    length_out: f64,
    asymmetric: bool,
    grade_in: f64,
    grade_out: f64,
    grade_change: f64,
    k_value: f64,
    sta_start: f64,
    sta_end: f64,
    elev_bvc: f64,
    elev_evc: f64,
    desc: Option<String>,
}

impl Parabola {
    pub fn new(data: ParabolaData) -> Result<Self> {
        let length = data.length;
        if length < 0.0 {
            return Err(GeometryError::NegativeLength(length));
        }
        if length == 0.0 {
            return Err(GeometryError::degenerate("parabola has zero length"));
        }
        let asymmetric = data.length_in.is_some() || data.length_out.is_some();
        let (length_in, length_out) = match (data.length_in, data.length_out) {
            (Some(l_in), Some(l_out)) => (l_in, l_out),
            (Some(l_in), None) => (l_in, length - l_in),
            (None, Some(l_out)) => (length - l_out, l_out),
            (None, None) => (length / 2.0, length / 2.0),
        };
        if length_in < 0.0 || length_out < 0.0 {
            return Err(GeometryError::invalid(
                "lengthIn",
                format!("curve halves must not be negative, got {length_in} and {length_out}"),
            ));
        }
        if (length_in + length_out - length).abs() > 1e-6 {
            return Err(GeometryError::invalid(
                "lengthIn",
                format!("{length_in} + {length_out} does not add up to length {length}"),
            ));
        }

        let grade_change = data.grade_out - data.grade_in;
        let k_value = if grade_change == 0.0 {
            f64::INFINITY
        } else {
            length / grade_change.abs()
        };
        Ok(Self {
            pvi: data.pvi,
            length,
            length_in,
            length_out,
            asymmetric,
            grade_in: data.grade_in,
            grade_out: data.grade_out,
            grade_change,
            k_value,
            sta_start: data.pvi.station - length_in,
            sta_end: data.pvi.station + length_out,
            elev_bvc: data.pvi.elevation - length_in * data.grade_in,
            elev_evc: data.pvi.elevation + length_out * data.grade_out,
            desc: data.desc,
        })
    }

    pub fn pvi(&self) -> Pvi {
        self.pvi
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn length_in(&self) -> f64 {
        self.length_in
    }

    pub fn length_out(&self) -> f64 {
        self.length_out
    }

    pub fn is_asymmetric(&self) -> bool {
        self.asymmetric
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

    /// Length per unit of grade change; infinite for a flat curve.
    pub fn k_value(&self) -> f64 {
        self.k_value
    }

    pub fn elev_bvc(&self) -> f64 {
        self.elev_bvc
    }

    pub fn elev_evc(&self) -> f64 {
        self.elev_evc
    }

    /// Elevation on the incoming branch, `x` measured from the BVC.
    fn elevation_before_pvi(&self, x: f64) -> f64 {
        self.elev_bvc + self.grade_in * x + self.grade_change * x * x / (2.0 * self.length)
    }

    /// Elevation on the outgoing branch, `x` measured from the PVI.
    fn elevation_after_pvi(&self, x: f64) -> f64 {
        let rest = self.length_out - x;
        self.pvi.elevation + self.grade_out * x + self.grade_change * rest * rest / (2.0 * self.length)
    }

    /// Station and elevation where the grade is zero, if it lies on the curve.
    ///
    /// Asymmetric curves are only searched before the PVI.
    pub fn high_low_point(&self) -> Option<(f64, f64)> {
        if self.grade_change.abs() < 1e-10 {
            return None;
        }
        let x = -self.grade_in * self.length / self.grade_change;
        let limit = if self.asymmetric {
            self.length_in
        } else {
            self.length
        };
        if !(0.0..=limit).contains(&x) {
            return None;
        }
        let station = self.sta_start + x;
        self.elevation_at_station(station)
            .ok()
            .map(|elevation| (station, elevation))
    }

    pub fn to_data(&self) -> ParabolaData {
        let (length_in, length_out) = if self.asymmetric {
            (Some(self.length_in), Some(self.length_out))
        } else {
            (None, None)
        };
        ParabolaData {
            pvi: self.pvi,
            length: self.length,
            length_in,
            length_out,
            grade_in: self.grade_in,
            grade_out: self.grade_out,
            desc: self.desc.clone(),
        }
    }
}

impl VerticalGeometry for Parabola {
    fn station_range(&self) -> (f64, f64) {
        (self.sta_start, self.sta_end)
    }

    /// Asymmetric curves keep the grade continuous at the PVI but step in
    /// elevation there by `grade_change * (length_out² - length_in²) / (2 * length)`.
    fn elevation_at_station(&self, station: f64) -> Result<f64> {
        check_station(station, self.station_range())?;
        if self.asymmetric && station > self.pvi.station {
            Ok(self.elevation_after_pvi(station - self.pvi.station))
        } else {
            Ok(self.elevation_before_pvi(station - self.sta_start))
        }
    }

    fn grade_at_station(&self, station: f64) -> Result<f64> {
        check_station(station, self.station_range())?;
        if self.asymmetric && station > self.pvi.station {
            let x = station - self.pvi.station;
            Ok(self.grade_out - self.grade_change * (self.length_out - x) / self.length)
        } else {
            let x = station - self.sta_start;
            Ok(self.grade_in + self.grade_change * x / self.length)
        }
    }
}
