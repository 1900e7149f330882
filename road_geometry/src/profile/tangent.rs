use serde::{Deserialize, Serialize};

use super::{check_station, VerticalGeometry};
use crate::error::{GeometryError, Result};

/// Input of a constant-grade vertical segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TangentData {
    pub sta_start: f64,
    pub elev_start: f64,
    pub sta_end: f64,
    pub elev_end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// Straight grade line between two station/elevation pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Tangent {
    sta_start: f64,
    elev_start: f64,
    sta_end: f64,
    elev_end: f64,
    grade: f64,
    desc: Option<String>,
}

impl Tangent {
    pub fn new(data: TangentData) -> Result<Self> {
        let length = data.sta_end - data.sta_start;
        if length < 0.0 {
            return Err(GeometryError::NegativeLength(length));
        }
        let grade = if length == 0.0 {
            0.0
        } else {
            (data.elev_end - data.elev_start) / length
        };
        Ok(Self {
            sta_start: data.sta_start,
            elev_start: data.elev_start,
            sta_end: data.sta_end,
            elev_end: data.elev_end,
            grade,
            desc: data.desc,
        })
    }

    pub(crate) fn between(sta_start: f64, elev_start: f64, sta_end: f64, elev_end: f64) -> Result<Self> {
        Self::new(TangentData {
            sta_start,
            elev_start,
            sta_end,
            elev_end,
            desc: None,
        })
    }

    pub fn grade(&self) -> f64 {
        self.grade
    }

    pub fn length(&self) -> f64 {
        self.sta_end - self.sta_start
    }

    pub fn elev_start(&self) -> f64 {
        self.elev_start
    }

    pub fn elev_end(&self) -> f64 {
        self.elev_end
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn to_data(&self) -> TangentData {
        TangentData {
            sta_start: self.sta_start,
            elev_start: self.elev_start,
            sta_end: self.sta_end,
            elev_end: self.elev_end,
            desc: self.desc.clone(),
        }
    }
}

impl VerticalGeometry for Tangent {
    fn station_range(&self) -> (f64, f64) {
        (self.sta_start, self.sta_end)
    }

    fn elevation_at_station(&self, station: f64) -> Result<f64> {
        check_station(station, self.station_range())?;
        Ok(self.elev_start + self.grade * (station - self.sta_start))
    }

    fn grade_at_station(&self, station: f64) -> Result<f64> {
        check_station(station, self.station_range())?;
        Ok(self.grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_and_elevation() {
        let t = Tangent::between(0.0, 100.0, 100.0, 105.0).unwrap();
        assert!((t.grade_at_station(50.0).unwrap() - 0.05).abs() < 1e-12);
        assert!((t.elevation_at_station(50.0).unwrap() - 102.5).abs() < 1e-12);
        assert!((t.length() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn outside_range_fails() {
        let t = Tangent::between(0.0, 100.0, 100.0, 105.0).unwrap();
        assert!(t.elevation_at_station(101.0).unwrap_err().is_out_of_range());
        assert!(t.elevation_at_station(-1.0).unwrap_err().is_out_of_range());
    }

    #[test]
    fn zero_length_has_zero_grade() {
        let t = Tangent::between(10.0, 5.0, 10.0, 7.0).unwrap();
        assert_eq!(t.grade(), 0.0);
        assert_eq!(t.elevation_at_station(10.0).unwrap(), 5.0);
    }

    #[test]
    fn reversed_stations_are_rejected() {
        assert!(Tangent::between(10.0, 0.0, 5.0, 0.0).is_err());
    }
}
