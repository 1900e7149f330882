//! Design and surface profiles of an alignment, and station queries across them.

use serde::{Deserialize, Serialize};

use super::{assemble, AssemblyWarning, Pvi, Tangent, VerticalCurveData, VerticalElement, VerticalGeometry};
use crate::alignment::sample_distances;
use crate::error::{GeometryError, Result};

/// LandXML `<ProfAlign>`: a design profile given by PVIs and curves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfAlignData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(rename = "PVI", default)]
    pub pvis: Vec<Pvi>,
    #[serde(rename = "Curves", default, skip_serializing_if = "Vec::is_empty")]
    pub curves: Vec<VerticalCurveData>,
}

/// LandXML `<ProfSurf>`: a sampled ground profile as `[station, elevation]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfSurfData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default)]
    pub points: Vec<(f64, f64)>,
}

/// LandXML `<Profile>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilesData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sta_start: Option<f64>,
    #[serde(rename = "ProfAlign", default)]
    pub prof_align: Vec<ProfAlignData>,
    #[serde(rename = "ProfSurf", default)]
    pub prof_surf: Vec<ProfSurfData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Design,
    Surface,
}

/// One sample of [`Profiles::generate_profile_points`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfilePoint {
    pub station: f64,
    pub elevation: f64,
    pub grade: f64,
    /// Ground elevation, when a surface profile covers the station.
    pub surface_elevation: Option<f64>,
}

/// A single design or surface profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    name: String,
    desc: Option<String>,
    kind: ProfileKind,
    pvis: Vec<Pvi>,
    curves: Vec<VerticalCurveData>,
    elements: Vec<VerticalElement>,
    warnings: Vec<AssemblyWarning>,
}

impl Profile {
    /// Assembles a design profile from its PVIs and curves.
    pub fn design(data: ProfAlignData) -> Result<Self> {
        let assembly = assemble(&data.pvis, &data.curves)?;
        Ok(Self {
            name: data.name.unwrap_or_else(|| "Design Profile".to_string()),
            desc: data.desc,
            kind: ProfileKind::Design,
            pvis: data.pvis,
            curves: data.curves,
            elements: assembly.elements,
            warnings: assembly.warnings,
        })
    }

    /// Builds a surface profile as grade lines through the sorted points.
    pub fn surface(data: ProfSurfData) -> Result<Self> {
        if data.points.len() < 2 {
            return Err(GeometryError::InsufficientPoints {
                required: 2,
                actual: data.points.len(),
            });
        }
        let mut pvis: Vec<Pvi> = data
            .points
            .iter()
            .map(|&(station, elevation)| Pvi::new(station, elevation))
            .collect();
        pvis.sort_by(|a, b| a.station.total_cmp(&b.station));
        let elements = pvis
            .windows(2)
            .map(|w| {
                Tangent::between(w[0].station, w[0].elevation, w[1].station, w[1].elevation)
                    .map(VerticalElement::Tangent)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: data.name.unwrap_or_else(|| "Surface Profile".to_string()),
            desc: data.desc,
            kind: ProfileKind::Surface,
            pvis,
            curves: Vec::new(),
            elements,
            warnings: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn pvis(&self) -> &[Pvi] {
        &self.pvis
    }

    pub fn elements(&self) -> &[VerticalElement] {
        &self.elements
    }

    /// Curves skipped while assembling.
    pub fn warnings(&self) -> &[AssemblyWarning] {
        &self.warnings
    }

    /// Stations covered by the profile, `None` when it has no elements.
    pub fn station_range(&self) -> Option<(f64, f64)> {
        let first = self.elements.first()?.station_range().0;
        let last = self.elements.last()?.station_range().1;
        Some((first, last))
    }

    /// First element whose range contains `station`.
    pub fn element_at_station(&self, station: f64) -> Option<&VerticalElement> {
        self.elements.iter().find(|e| {
            let (start, end) = e.station_range();
            (start..=end).contains(&station)
        })
    }

    fn locate(&self, station: f64) -> Result<&VerticalElement> {
        self.element_at_station(station).ok_or_else(|| match self.station_range() {
            Some((start, end)) => GeometryError::out_of_range(station, start, end),
            None => GeometryError::degenerate(format!("profile '{}' has no elements", self.name)),
        })
    }

    pub fn elevation_at_station(&self, station: f64) -> Result<f64> {
        self.locate(station)?.elevation_at_station(station)
    }

    pub fn grade_at_station(&self, station: f64) -> Result<f64> {
        self.locate(station)?.grade_at_station(station)
    }

    /// Turning points of the parabolic curves.
    pub fn high_low_points(&self) -> Vec<(f64, f64)> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                VerticalElement::Parabola(p) => p.high_low_point(),
                _ => None,
            })
            .collect()
    }

    /// `(station, elevation)` every `step` from the start, ending exactly at the end.
    pub fn generate_points(&self, step: f64) -> Result<Vec<(f64, f64)>> {
        let Some((start, end)) = self.station_range() else {
            return Ok(Vec::new());
        };
        sample_distances(end - start, step)?
            .into_iter()
            .map(|d| {
                let station = start + d;
                Ok((station, self.elevation_at_station(station)?))
            })
            .collect()
    }

    fn prof_align_data(&self) -> ProfAlignData {
        ProfAlignData {
            name: Some(self.name.clone()),
            desc: self.desc.clone(),
            pvis: self.pvis.clone(),
            curves: self.curves.clone(),
        }
    }

    fn prof_surf_data(&self) -> ProfSurfData {
        ProfSurfData {
            name: Some(self.name.clone()),
            desc: self.desc.clone(),
            points: self.pvis.iter().map(|p| (p.station, p.elevation)).collect(),
        }
    }
}

/// Design and surface profiles of one alignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profiles {
    name: Option<String>,
    desc: Option<String>,
    sta_start: Option<f64>,
    design: Vec<Profile>,
    surface: Vec<Profile>,
}

impl Profiles {
    pub fn from_data(data: ProfilesData) -> Result<Self> {
        let design = data
            .prof_align
            .into_iter()
            .enumerate()
            .map(|(i, d)| Profile::design(d).map_err(|e| e.in_element(i, "ProfAlign")))
            .collect::<Result<Vec<_>>>()?;
        let surface = data
            .prof_surf
            .into_iter()
            .enumerate()
            .map(|(i, d)| Profile::surface(d).map_err(|e| e.in_element(i, "ProfSurf")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: data.name,
            desc: data.desc,
            sta_start: data.sta_start,
            design,
            surface,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn sta_start(&self) -> Option<f64> {
        self.sta_start
    }

    pub fn design_profiles(&self) -> &[Profile] {
        &self.design
    }

    pub fn surface_profiles(&self) -> &[Profile] {
        &self.surface
    }

    /// Design or surface profile with the given name.
    pub fn profile_by_name(&self, name: &str) -> Option<&Profile> {
        self.design
            .iter()
            .chain(&self.surface)
            .find(|p| p.name == name)
    }

    /// Named design profile, or the first one when `name` is `None`.
    pub fn design(&self, name: Option<&str>) -> Result<&Profile> {
        select(&self.design, name, "ProfAlign")
    }

    /// Named surface profile, or the first one when `name` is `None`.
    pub fn surface(&self, name: Option<&str>) -> Result<&Profile> {
        select(&self.surface, name, "ProfSurf")
    }

    pub fn elevation_at_station(&self, station: f64, design: Option<&str>) -> Result<f64> {
        self.design(design)?.elevation_at_station(station)
    }

    pub fn grade_at_station(&self, station: f64, design: Option<&str>) -> Result<f64> {
        self.design(design)?.grade_at_station(station)
    }

    pub fn surface_elevation_at_station(&self, station: f64, surface: Option<&str>) -> Result<f64> {
        self.surface(surface)?.elevation_at_station(station)
    }

    /// Design minus surface elevation: positive is fill, negative is cut.
    pub fn cut_fill_at_station(
        &self,
        station: f64,
        design: Option<&str>,
        surface: Option<&str>,
    ) -> Result<f64> {
        let design = self.elevation_at_station(station, design)?;
        let ground = self.surface_elevation_at_station(station, surface)?;
        Ok(design - ground)
    }

    /// Samples a design profile every `step`, with ground elevations from
    /// the selected surface profile (the first one when `surface` is `None`).
    pub fn generate_profile_points(
        &self,
        step: f64,
        design: Option<&str>,
        surface: Option<&str>,
    ) -> Result<Vec<ProfilePoint>> {
        let design = self.design(design)?;
        let ground = match surface {
            Some(name) => Some(self.surface(Some(name))?),
            None => self.surface.first(),
        };
        design
            .generate_points(step)?
            .into_iter()
            .map(|(station, elevation)| {
                Ok(ProfilePoint {
                    station,
                    elevation,
                    grade: design.grade_at_station(station)?,
                    surface_elevation: ground.and_then(|g| g.elevation_at_station(station).ok()),
                })
            })
            .collect()
    }

    /// Assembly warnings of every design profile.
    pub fn warnings(&self) -> impl Iterator<Item = &AssemblyWarning> {
        self.design.iter().flat_map(|p| p.warnings.iter())
    }

    pub fn to_data(&self) -> ProfilesData {
        ProfilesData {
            name: self.name.clone(),
            desc: self.desc.clone(),
            sta_start: self.sta_start,
            prof_align: self.design.iter().map(Profile::prof_align_data).collect(),
            prof_surf: self.surface.iter().map(Profile::prof_surf_data).collect(),
        }
    }
}

fn select<'a>(profiles: &'a [Profile], name: Option<&str>, tag: &'static str) -> Result<&'a Profile> {
    match name {
        None => profiles.first().ok_or(GeometryError::missing("Profile", tag)),
        Some(name) => profiles.iter().find(|p| p.name == name).ok_or_else(|| {
            GeometryError::invalid("profile", format!("no {tag} named '{name}'"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles() -> Profiles {
        Profiles::from_data(ProfilesData {
            name: Some("Main".into()),
            prof_align: vec![ProfAlignData {
                name: Some("FG".into()),
                pvis: vec![
                    Pvi::new(0.0, 100.0),
                    Pvi::new(500.0, 105.0),
                    Pvi::new(1000.0, 98.0),
                ],
                curves: vec![VerticalCurveData::ParaCurve {
                    station: 500.0,
                    length: 100.0,
                }],
                ..Default::default()
            }],
            prof_surf: vec![ProfSurfData {
                name: Some("EG".into()),
                points: vec![(1000.0, 99.0), (0.0, 101.0)],
                ..Default::default()
            }],
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn design_queries() {
        let p = profiles();
        assert!((p.elevation_at_station(250.0, None).unwrap() - 102.5).abs() < 1e-9);
        assert!((p.grade_at_station(0.0, Some("FG")).unwrap() - 0.01).abs() < 1e-12);
        assert!(p.elevation_at_station(1001.0, None).unwrap_err().is_out_of_range());
        assert!(p.elevation_at_station(-1.0, None).unwrap_err().is_out_of_range());
        assert!(p.elevation_at_station(10.0, Some("nope")).is_err());
    }

    #[test]
    fn surface_is_sorted() {
        let p = profiles();
        let eg = p.surface(None).unwrap();
        assert_eq!(eg.kind(), ProfileKind::Surface);
        assert_eq!(eg.station_range(), Some((0.0, 1000.0)));
        assert!((p.surface_elevation_at_station(500.0, Some("EG")).unwrap() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn cut_fill_sign() {
        let p = profiles();
        // Design 100 against ground 101 at the start: cut.
        assert!((p.cut_fill_at_station(0.0, None, None).unwrap() + 1.0).abs() < 1e-12);
        // Crest sits above the ground.
        let mid = p.cut_fill_at_station(500.0, None, None).unwrap();
        assert!(mid > 0.0);
    }

    #[test]
    fn profile_points_cover_range() {
        let p = profiles();
        let pts = p.generate_profile_points(300.0, None, None).unwrap();
        let stations: Vec<f64> = pts.iter().map(|pt| pt.station).collect();
        assert_eq!(stations, vec![0.0, 300.0, 600.0, 900.0, 1000.0]);
        assert!(pts.iter().all(|pt| pt.surface_elevation.is_some()));
        assert!(p.generate_profile_points(0.0, None, None).is_err());
    }

    #[test]
    fn lookup_by_name() {
        let p = profiles();
        assert_eq!(p.profile_by_name("EG").unwrap().kind(), ProfileKind::Surface);
        assert_eq!(p.profile_by_name("FG").unwrap().kind(), ProfileKind::Design);
        assert!(p.profile_by_name("XX").is_none());
        assert_eq!(p.warnings().count(), 0);
    }

    #[test]
    fn surface_needs_two_points() {
        let err = Profiles::from_data(ProfilesData {
            prof_surf: vec![ProfSurfData {
                points: vec![(0.0, 1.0)],
                ..Default::default()
            }],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, GeometryError::Element { kind: "ProfSurf", .. }));
    }

    #[test]
    fn missing_design_profile() {
        let p = Profiles::default();
        assert_eq!(
            p.elevation_at_station(0.0, None).unwrap_err(),
            GeometryError::missing("Profile", "ProfAlign")
        );
    }

    #[test]
    fn data_round_trip() {
        let p = profiles();
        let json = serde_json::to_string(&p.to_data()).unwrap();
        let back = Profiles::from_data(serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(back, p);
    }
}
