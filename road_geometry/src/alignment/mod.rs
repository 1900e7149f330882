//! Horizontal alignments built from lines, circular curves and clothoid
//! spirals, plus the combined 3D alignment.

pub mod curve;
mod design;
mod element;
mod horizontal;
pub mod line;
pub mod spiral;
pub mod station;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use curve::{Curve, CurveData, CurveType};
pub use design::PiData;
pub use element::{ElementHeader, HorizontalGeometry};
pub(crate) use element::sample_distances;
pub use horizontal::{AlignPi, AlignPiData, HorizontalAlignment, StationIncrements};
pub use line::{Line, LineData};
pub use spiral::{Spiral, SpiralData, SpiralType};
pub use station::{StationEquation, StationEquationData, StationEquations};

use crate::error::{GeometryError, Result};
use crate::geometry::{Point, Point3, Side, Vector};
use crate::profile::{Profiles, ProfilesData};

/// Serialized form of a [`HorizontalElement`], tagged like LandXML `<CoordGeom>` children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum HorizontalElementData {
    Line(LineData),
    Curve(CurveData),
    Spiral(SpiralData),
}

impl HorizontalElementData {
    pub fn kind(&self) -> ElementKind {
        match self {
            HorizontalElementData::Line(_) => ElementKind::Line,
            HorizontalElementData::Curve(_) => ElementKind::Curve,
            HorizontalElementData::Spiral(_) => ElementKind::Spiral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Line,
    Curve,
    Spiral,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Line => "Line",
            ElementKind::Curve => "Curve",
            ElementKind::Spiral => "Spiral",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One geometry element of a horizontal alignment.
#[derive(Debug, Clone, PartialEq)]
pub enum HorizontalElement {
    Line(Line),
    Curve(Curve),
    Spiral(Spiral),
}

impl HorizontalElement {
    pub fn from_data(data: HorizontalElementData) -> Result<Self> {
        Ok(match data {
            HorizontalElementData::Line(d) => HorizontalElement::Line(Line::new(d)?),
            HorizontalElementData::Curve(d) => HorizontalElement::Curve(Curve::new(d)?),
            HorizontalElementData::Spiral(d) => HorizontalElement::Spiral(Spiral::new(d)?),
        })
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            HorizontalElement::Line(_) => ElementKind::Line,
            HorizontalElement::Curve(_) => ElementKind::Curve,
            HorizontalElement::Spiral(_) => ElementKind::Spiral,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            HorizontalElement::Line(e) => e.name(),
            HorizontalElement::Curve(e) => e.name(),
            HorizontalElement::Spiral(e) => e.name(),
        }
    }

    /// Displayed start station, assigned by the alignment when not given.
    pub fn sta_start(&self) -> Option<f64> {
        match self {
            HorizontalElement::Line(e) => e.sta_start(),
            HorizontalElement::Curve(e) => e.sta_start(),
            HorizontalElement::Spiral(e) => e.sta_start(),
        }
    }

    pub fn sta_end(&self) -> Option<f64> {
        match self {
            HorizontalElement::Line(e) => e.sta_end(),
            HorizontalElement::Curve(e) => e.sta_end(),
            HorizontalElement::Spiral(e) => e.sta_end(),
        }
    }

    pub(crate) fn set_sta_start(&mut self, station: f64) {
        match self {
            HorizontalElement::Line(e) => e.set_sta_start(station),
            HorizontalElement::Curve(e) => e.set_sta_start(station),
            HorizontalElement::Spiral(e) => e.set_sta_start(station),
        }
    }

    pub fn start_point(&self) -> Point {
        match self {
            HorizontalElement::Line(e) => e.start_point(),
            HorizontalElement::Curve(e) => e.start_point(),
            HorizontalElement::Spiral(e) => e.start_point(),
        }
    }

    pub fn end_point(&self) -> Point {
        match self {
            HorizontalElement::Line(e) => e.end_point(),
            HorizontalElement::Curve(e) => e.end_point(),
            HorizontalElement::Spiral(e) => e.end_point(),
        }
    }

    pub fn to_data(&self) -> HorizontalElementData {
        match self {
            HorizontalElement::Line(e) => HorizontalElementData::Line(e.to_data()),
            HorizontalElement::Curve(e) => HorizontalElementData::Curve(e.to_data()),
            HorizontalElement::Spiral(e) => HorizontalElementData::Spiral(e.to_data()),
        }
    }
}

impl HorizontalGeometry for HorizontalElement {
    fn length(&self) -> f64 {
        match self {
            HorizontalElement::Line(e) => e.length(),
            HorizontalElement::Curve(e) => e.length(),
            HorizontalElement::Spiral(e) => e.length(),
        }
    }

    fn point_at_distance(&self, s: f64) -> Result<Point> {
        match self {
            HorizontalElement::Line(e) => e.point_at_distance(s),
            HorizontalElement::Curve(e) => e.point_at_distance(s),
            HorizontalElement::Spiral(e) => e.point_at_distance(s),
        }
    }

    fn orthogonal_at(&self, s: f64, side: Side) -> Result<(Point, Vector)> {
        match self {
            HorizontalElement::Line(e) => e.orthogonal_at(s, side),
            HorizontalElement::Curve(e) => e.orthogonal_at(s, side),
            HorizontalElement::Spiral(e) => e.orthogonal_at(s, side),
        }
    }

    fn project_point(&self, point: Point) -> Option<f64> {
        match self {
            HorizontalElement::Line(e) => e.project_point(point),
            HorizontalElement::Curve(e) => e.project_point(point),
            HorizontalElement::Spiral(e) => e.project_point(point),
        }
    }
}

/// LandXML `<Alignment>` as a serde document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sta_start: Option<f64>,
    /// Total length; the sum of the element lengths when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Point>,
    #[serde(rename = "CoordGeom", default)]
    pub coord_geom: Vec<HorizontalElementData>,
    #[serde(rename = "StaEquation", default, skip_serializing_if = "Vec::is_empty")]
    pub sta_equation: Vec<StationEquationData>,
    #[serde(rename = "AlignPIs", default, skip_serializing_if = "Vec::is_empty")]
    pub align_pis: Vec<AlignPiData>,
    #[serde(rename = "Profile", default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfilesData>,
}

/// Horizontal alignment with its optional design and surface profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    horizontal: HorizontalAlignment,
    profiles: Option<Profiles>,
}

impl Alignment {
    pub fn new(horizontal: HorizontalAlignment, profiles: Option<Profiles>) -> Self {
        Self {
            horizontal,
            profiles,
        }
    }

    pub fn from_data(mut data: AlignmentData) -> Result<Self> {
        let profiles = data.profile.take().map(Profiles::from_data).transpose()?;
        Ok(Self::new(HorizontalAlignment::from_data(data)?, profiles))
    }

    /// Like [`Alignment::from_data`] but skips horizontal elements that fail
    /// to build, returning their errors.
    pub fn from_data_lossy(mut data: AlignmentData) -> Result<(Self, Vec<GeometryError>)> {
        let profiles = data.profile.take().map(Profiles::from_data).transpose()?;
        let (horizontal, skipped) = HorizontalAlignment::from_data_lossy(data)?;
        Ok((Self::new(horizontal, profiles), skipped))
    }

    pub fn horizontal(&self) -> &HorizontalAlignment {
        &self.horizontal
    }

    pub fn profiles(&self) -> Option<&Profiles> {
        self.profiles.as_ref()
    }

    pub fn set_profiles(&mut self, profiles: Option<Profiles>) {
        self.profiles = profiles;
    }

    fn require_profiles(&self) -> Result<&Profiles> {
        self.profiles
            .as_ref()
            .ok_or(GeometryError::missing("Alignment", "Profile"))
    }

    /// Design elevation from the named profile, or the first one.
    pub fn elevation_at_station(&self, station: f64, profile: Option<&str>) -> Result<f64> {
        self.require_profiles()?.elevation_at_station(station, profile)
    }

    /// Plan position at `station` with the design elevation as `z`.
    pub fn point3_at_station(&self, station: f64, profile: Option<&str>) -> Result<Point3> {
        let p = self.horizontal.point_at_station(station)?;
        let z = self.elevation_at_station(station, profile)?;
        Ok(Point3::new(p.x, p.y, z))
    }

    pub fn to_data(&self) -> AlignmentData {
        AlignmentData {
            profile: self.profiles.as_ref().map(Profiles::to_data),
            ..self.horizontal.to_data()
        }
    }
}
