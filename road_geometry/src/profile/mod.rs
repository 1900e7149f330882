//! Vertical profile geometry: grade lines, vertical curves and their assembly
//! into design and surface profiles.

pub mod arc;
pub mod assembler;
pub mod parabola;
mod profiles;
pub mod tangent;

use serde::{Deserialize, Serialize};

pub use arc::{Arc, ArcData};
pub use assembler::{assemble, Assembly, AssemblyWarning, SkipReason, VerticalCurveData};
pub use parabola::{Parabola, ParabolaData};
pub use profiles::{ProfAlignData, ProfSurfData, Profile, ProfileKind, ProfilePoint, Profiles, ProfilesData};
pub use tangent::{Tangent, TangentData};

use crate::error::{GeometryError, Result};

/// Point of vertical intersection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pvi {
    pub station: f64,
    pub elevation: f64,
}

impl Pvi {
    pub fn new(station: f64, elevation: f64) -> Self {
        Self { station, elevation }
    }

    /// Grade of the line from `self` to `next`, zero when the stations coincide.
    pub fn grade_to(&self, next: &Pvi) -> f64 {
        let run = next.station - self.station;
        if run == 0.0 {
            0.0
        } else {
            (next.elevation - self.elevation) / run
        }
    }
}

/// Station queries shared by the vertical element types.
pub trait VerticalGeometry {
    /// Inclusive `(start, end)` stations covered by the element.
    fn station_range(&self) -> (f64, f64);

    fn elevation_at_station(&self, station: f64) -> Result<f64>;

    fn grade_at_station(&self, station: f64) -> Result<f64>;
}

pub(crate) fn check_station(station: f64, (start, end): (f64, f64)) -> Result<()> {
    if (start..=end).contains(&station) {
        Ok(())
    } else {
        Err(GeometryError::out_of_range(station, start, end))
    }
}

/// Serialized form of a [`VerticalElement`], tagged by LandXML element name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum VerticalElementData {
    Tangent(TangentData),
    ParaCurve(ParabolaData),
    UnsymParaCurve(ParabolaData),
    CircCurve(ArcData),
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerticalElement {
    Tangent(Tangent),
    Parabola(Parabola),
    Arc(Arc),
}

impl VerticalElement {
    pub fn from_data(data: VerticalElementData) -> Result<Self> {
        Ok(match data {
            VerticalElementData::Tangent(d) => VerticalElement::Tangent(Tangent::new(d)?),
            VerticalElementData::ParaCurve(d) | VerticalElementData::UnsymParaCurve(d) => {
                VerticalElement::Parabola(Parabola::new(d)?)
            }
            VerticalElementData::CircCurve(d) => VerticalElement::Arc(Arc::new(d)?),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            VerticalElement::Tangent(_) => "Tangent",
            VerticalElement::Parabola(p) if p.is_asymmetric() => "UnsymParaCurve",
            VerticalElement::Parabola(_) => "ParaCurve",
            VerticalElement::Arc(_) => "CircCurve",
        }
    }

    /// Grade leaving the element.
    pub fn grade_out(&self) -> f64 {
        match self {
            VerticalElement::Tangent(t) => t.grade(),
            VerticalElement::Parabola(p) => p.grade_out(),
            VerticalElement::Arc(a) => a.grade_out(),
        }
    }

    /// Elevation at the end station.
    pub fn elev_end(&self) -> f64 {
        match self {
            VerticalElement::Tangent(t) => t.elev_end(),
            VerticalElement::Parabola(p) => p.elev_evc(),
            VerticalElement::Arc(a) => a.elev_evc(),
        }
    }

    pub fn to_data(&self) -> VerticalElementData {
        match self {
            VerticalElement::Tangent(t) => VerticalElementData::Tangent(t.to_data()),
            VerticalElement::Parabola(p) if p.is_asymmetric() => {
                VerticalElementData::UnsymParaCurve(p.to_data())
            }
            VerticalElement::Parabola(p) => VerticalElementData::ParaCurve(p.to_data()),
            VerticalElement::Arc(a) => VerticalElementData::CircCurve(a.to_data()),
        }
    }
}

impl VerticalGeometry for VerticalElement {
    fn station_range(&self) -> (f64, f64) {
        match self {
            VerticalElement::Tangent(t) => t.station_range(),
            VerticalElement::Parabola(p) => p.station_range(),
            VerticalElement::Arc(a) => a.station_range(),
        }
    }

    fn elevation_at_station(&self, station: f64) -> Result<f64> {
        match self {
            VerticalElement::Tangent(t) => t.elevation_at_station(station),
            VerticalElement::Parabola(p) => p.elevation_at_station(station),
            VerticalElement::Arc(a) => a.elevation_at_station(station),
        }
    }

    fn grade_at_station(&self, station: f64) -> Result<f64> {
        match self {
            VerticalElement::Tangent(t) => t.grade_at_station(station),
            VerticalElement::Parabola(p) => p.grade_at_station(station),
            VerticalElement::Arc(a) => a.grade_at_station(station),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_between_pvis() {
        let a = Pvi::new(0.0, 100.0);
        let b = Pvi::new(500.0, 105.0);
        assert!((a.grade_to(&b) - 0.01).abs() < 1e-12);
        assert_eq!(a.grade_to(&a), 0.0);
    }

    #[test]
    fn element_data_is_tagged() {
        let json = r#"{"Type":"ParaCurve","pvi":{"station":500.0,"elevation":105.0},
            "length":100.0,"gradeIn":0.01,"gradeOut":-0.014}"#;
        let data: VerticalElementData = serde_json::from_str(json).unwrap();
        let element = VerticalElement::from_data(data).unwrap();
        assert_eq!(element.kind(), "ParaCurve");
        assert_eq!(element.station_range(), (450.0, 550.0));

        let back = serde_json::to_value(element.to_data()).unwrap();
        assert_eq!(back["Type"], "ParaCurve");
        assert_eq!(back["gradeIn"], 0.01);
    }
}
