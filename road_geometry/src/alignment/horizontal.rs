//! Station-based queries over a chain of horizontal elements.

use serde::{Deserialize, Serialize};

use super::{
    AlignmentData, ElementKind, HorizontalElement, HorizontalGeometry, StationEquations,
};
use crate::error::{check_step, GeometryError, Result};
use crate::geometry::{distance, Point, Side, Vector, STATION_TOLERANCE};

/// Allowed gap between consecutive elements and at the alignment start.
pub const CONTINUITY_TOLERANCE: f64 = 1e-3;

/// Offsets closer than this are reported as zero.
const ON_ALIGNMENT_TOLERANCE: f64 = 1e-3;

/// Station spacing per element type for [`HorizontalAlignment::generate_stations`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StationIncrements {
    pub line: f64,
    pub curve: f64,
    pub spiral: f64,
}

impl Default for StationIncrements {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

impl StationIncrements {
    pub fn uniform(increment: f64) -> Self {
        Self {
            line: increment,
            curve: increment,
            spiral: increment,
        }
    }

    pub fn for_kind(&self, kind: ElementKind) -> f64 {
        match kind {
            ElementKind::Line => self.line,
            ElementKind::Curve => self.curve,
            ElementKind::Spiral => self.spiral,
        }
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [("Line", self.line), ("Curve", self.curve), ("Spiral", self.spiral)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(GeometryError::invalid(
                    "increments",
                    format!("{field} increment must be positive, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// LandXML `<PI>` entry of `<AlignPIs>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignPiData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<f64>,
    pub point: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// Alignment PI with its station resolved by projection when not given.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignPi {
    pub station: Option<f64>,
    pub point: Point,
    pub desc: Option<String>,
}

/// Ordered, continuous chain of horizontal elements with stationing.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalAlignment {
    name: Option<String>,
    desc: Option<String>,
    sta_start: f64,
    length: f64,
    start: Point,
    elements: Vec<HorizontalElement>,
    /// Internal `(start, end)` station of every element.
    spans: Vec<(f64, f64)>,
    equations: StationEquations,
    align_pis: Vec<AlignPi>,
}

impl HorizontalAlignment {
    /// Builds the alignment, failing on the first bad element or gap.
    pub fn from_data(mut data: AlignmentData) -> Result<Self> {
        let elements = std::mem::take(&mut data.coord_geom)
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                let kind = d.kind();
                HorizontalElement::from_data(d).map_err(|e| e.in_element(i, kind.as_str()))
            })
            .collect::<Result<Vec<_>>>()?;
        check_continuity(&elements, true)?;
        Self::build(data, elements)
    }

    /// Builds the alignment from the elements that construct successfully.
    ///
    /// Errors of the skipped elements are returned alongside; gaps between
    /// the remaining elements are logged rather than rejected.
    pub fn from_data_lossy(mut data: AlignmentData) -> Result<(Self, Vec<GeometryError>)> {
        let coord_geom = std::mem::take(&mut data.coord_geom);
        let mut elements = Vec::with_capacity(coord_geom.len());
        let mut skipped = Vec::new();
        for (i, d) in coord_geom.into_iter().enumerate() {
            let kind = d.kind();
            match HorizontalElement::from_data(d) {
                Ok(element) => elements.push(element),
                Err(e) => {
                    let e = e.in_element(i, kind.as_str());
                    log::warn!("skipping alignment element: {e}");
                    skipped.push(e);
                }
            }
        }
        check_continuity(&elements, false)?;
        Ok((Self::build(data, elements)?, skipped))
    }

    fn build(data: AlignmentData, mut elements: Vec<HorizontalElement>) -> Result<Self> {
        let first = elements
            .first()
            .ok_or_else(|| GeometryError::degenerate("alignment has no geometry elements"))?;
        let first_start = first.start_point();
        let start = match data.start {
            Some(start) => {
                if (start.x - first_start.x).abs() > CONTINUITY_TOLERANCE
                    || (start.y - first_start.y).abs() > CONTINUITY_TOLERANCE
                {
                    return Err(GeometryError::degenerate(format!(
                        "alignment start ({}, {}) does not match first element start ({}, {})",
                        start.x, start.y, first_start.x, first_start.y
                    )));
                }
                start
            }
            None => first_start,
        };

        let equations = StationEquations::new(data.sta_equation)?;
        let sta_start = data.sta_start.unwrap_or(0.0);
        let length = data
            .length
            .unwrap_or_else(|| elements.iter().map(HorizontalGeometry::length).sum());

        let mut internal = sta_start;
        let mut spans = Vec::with_capacity(elements.len());
        for element in &mut elements {
            let start = match element.sta_start() {
                Some(station) => equations.station_to_internal(station),
                None => {
                    element.set_sta_start(equations.internal_to_station(internal));
                    internal
                }
            };
            internal = start + element.length();
            spans.push((start, internal));
        }

        let mut alignment = Self {
            name: data.name,
            desc: data.desc,
            sta_start,
            length,
            start,
            elements,
            spans,
            equations,
            align_pis: Vec::new(),
        };
        let mut align_pis: Vec<AlignPi> = data
            .align_pis
            .into_iter()
            .map(|pi| AlignPi {
                station: pi.station.or_else(|| alignment.station_offset(pi.point).map(|(s, _)| s)),
                point: pi.point,
                desc: pi.desc,
            })
            .collect();
        if align_pis.iter().all(|pi| pi.station.is_some()) {
            align_pis.sort_by(|a, b| a.station.unwrap_or(0.0).total_cmp(&b.station.unwrap_or(0.0)));
        }
        alignment.align_pis = align_pis;
        log::debug!(
            "alignment {:?}: {} elements, stations {:.3} to {:.3}",
            alignment.name,
            alignment.elements.len(),
            alignment.sta_start,
            alignment.sta_end()
        );
        Ok(alignment)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn elements(&self) -> &[HorizontalElement] {
        &self.elements
    }

    pub fn equations(&self) -> &StationEquations {
        &self.equations
    }

    pub fn align_pis(&self) -> &[AlignPi] {
        &self.align_pis
    }

    /// Geometric length, unaffected by station equations.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn sta_start(&self) -> f64 {
        self.sta_start
    }

    /// Displayed end station.
    pub fn sta_end(&self) -> f64 {
        self.internal_to_station(self.internal_start() + self.length)
    }

    pub fn start_point(&self) -> Point {
        self.start
    }

    pub fn end_point(&self) -> Point {
        self.elements
            .last()
            .map(HorizontalElement::end_point)
            .unwrap_or(self.start)
    }

    pub fn station_to_internal(&self, station: f64) -> f64 {
        self.equations.station_to_internal(station)
    }

    pub fn internal_to_station(&self, internal: f64) -> f64 {
        self.equations.internal_to_station(internal)
    }

    fn internal_start(&self) -> f64 {
        self.station_to_internal(self.sta_start)
    }

    /// Element containing `station` and the distance into it.
    fn locate(&self, station: f64) -> Result<(&HorizontalElement, f64)> {
        let internal = self.station_to_internal(station);
        let start = self.internal_start();
        if internal < start - STATION_TOLERANCE || internal > start + self.length + STATION_TOLERANCE {
            return Err(GeometryError::out_of_range(station, self.sta_start, self.sta_end()));
        }
        let index = self
            .spans
            .iter()
            .position(|(lo, hi)| (*lo..=*hi).contains(&internal))
            .or_else(|| {
                self.spans.iter().position(|(lo, hi)| {
                    (lo - STATION_TOLERANCE..=hi + STATION_TOLERANCE).contains(&internal)
                })
            })
            .ok_or_else(|| GeometryError::degenerate(format!("no element at station {station}")))?;
        let element = &self.elements[index];
        let s = (internal - self.spans[index].0).clamp(0.0, element.length());
        Ok((element, s))
    }

    /// First element whose station range contains `station`.
    pub fn element_at_station(&self, station: f64) -> Option<&HorizontalElement> {
        self.locate(station).ok().map(|(element, _)| element)
    }

    pub fn point_at_station(&self, station: f64) -> Result<Point> {
        let (element, s) = self.locate(station)?;
        element.point_at_distance(s)
    }

    /// Point at `station` and the unit normal pointing to `side`.
    pub fn orthogonal_at_station(&self, station: f64, side: Side) -> Result<(Point, Vector)> {
        let (element, s) = self.locate(station)?;
        element.orthogonal_at(s, side)
    }

    /// Station and signed offset of the closest projection of `point`.
    ///
    /// Offsets are negative to the left and positive to the right. Returns
    /// `None` when the point projects onto no element.
    pub fn station_offset(&self, point: Point) -> Option<(f64, f64)> {
        let mut best: Option<(f64, f64, f64)> = None;
        for (element, (lo, _)) in self.elements.iter().zip(&self.spans) {
            let Some(s) = element.project_point(point) else {
                continue;
            };
            let Ok((foot, left)) = element.orthogonal_at(s, Side::Left) else {
                continue;
            };
            let dist = distance(point, foot);
            if best.is_some_and(|(d, _, _)| dist >= d) {
                continue;
            }
            let station = self.internal_to_station(lo + s);
            let offset = if dist < ON_ALIGNMENT_TOLERANCE {
                0.0
            } else if foot.to(point).dot(left) > 0.0 {
                -dist
            } else {
                dist
            };
            best = Some((dist, station, offset));
        }
        best.map(|(_, station, offset)| (station, offset))
    }

    /// Alignment PI recorded at `station`.
    pub fn pi_at_station(&self, station: f64, tolerance: f64) -> Option<&AlignPi> {
        self.align_pis
            .iter()
            .find(|pi| pi.station.is_some_and(|s| (s - station).abs() <= tolerance))
    }

    /// Displayed stations `sta_start, sta_start + step, ...` and the end station.
    fn sample_stations(&self, step: f64) -> Result<Vec<f64>> {
        check_step(step)?;
        let end = self.sta_end();
        let mut stations: Vec<f64> = (0..)
            .map(|i| self.sta_start + i as f64 * step)
            .take_while(|s| *s <= end)
            .collect();
        if stations.last().map_or(true, |last| (last - end).abs() > STATION_TOLERANCE) {
            stations.push(end);
        }
        Ok(stations)
    }

    /// `(station, point)` every `step` along the alignment, ending at the end station.
    pub fn generate_points(&self, step: f64) -> Result<Vec<(f64, Point)>> {
        self.sample_stations(step)?
            .into_iter()
            .map(|station| Ok((station, self.point_at_station(station)?)))
            .collect()
    }

    /// Like [`generate_points`](Self::generate_points) but moved `offset` to `side`.
    pub fn generate_offset_points(
        &self,
        offset: f64,
        step: f64,
        side: Side,
    ) -> Result<Vec<(f64, Point)>> {
        if offset < 0.0 {
            return Err(GeometryError::invalid(
                "offset",
                format!("must not be negative, got {offset}"),
            ));
        }
        self.sample_stations(step)?
            .into_iter()
            .map(|station| {
                let (point, normal) = self.orthogonal_at_station(station, side)?;
                Ok((station, point.offset(normal, offset)))
            })
            .collect()
    }

    /// Sorted, unique stations between `start` and `end` (the whole
    /// alignment by default).
    ///
    /// Each element contributes the multiples of its type's increment that
    /// fall inside it; `at_geometry_points` adds the element boundaries.
    pub fn generate_stations(
        &self,
        start: Option<f64>,
        end: Option<f64>,
        increments: &StationIncrements,
        at_geometry_points: bool,
    ) -> Result<Vec<f64>> {
        increments.validate()?;
        let (align_start, align_end) = (self.sta_start, self.sta_end());
        let start = start.unwrap_or(align_start);
        let end = end.unwrap_or(align_end);
        if start > end {
            return Err(GeometryError::invalid(
                "start",
                format!("start station {start} is after end station {end}"),
            ));
        }
        if start < align_start || end > align_end {
            return Err(GeometryError::out_of_range(
                if start < align_start { start } else { end },
                align_start,
                align_end,
            ));
        }

        let mut stations = vec![start, end];
        for (element, &(lo, hi)) in self.elements.iter().zip(&self.spans) {
            let elem_start = self.internal_to_station(lo);
            let elem_end = self.internal_to_station(hi);
            if at_geometry_points {
                stations.extend([elem_start, elem_end].into_iter().filter(|s| (start..=end).contains(s)));
            }
            if elem_end < start || elem_start > end {
                continue;
            }
            let increment = increments.for_kind(element.kind());
            let first = (start / increment).ceil() as i64;
            stations.extend(
                (first..)
                    .map(|k| k as f64 * increment)
                    .take_while(|s| *s <= end)
                    .filter(|s| (lo..=hi).contains(&self.station_to_internal(*s))),
            );
        }
        stations.sort_by(f64::total_cmp);
        stations.dedup_by(|a, b| (*a - *b).abs() < STATION_TOLERANCE);
        Ok(stations)
    }

    pub fn to_data(&self) -> AlignmentData {
        AlignmentData {
            name: self.name.clone(),
            desc: self.desc.clone(),
            sta_start: Some(self.sta_start),
            length: Some(self.length),
            start: Some(self.start),
            coord_geom: self.elements.iter().map(HorizontalElement::to_data).collect(),
            sta_equation: self.equations.to_data(),
            align_pis: self
                .align_pis
                .iter()
                .map(|pi| AlignPiData {
                    station: pi.station,
                    point: pi.point,
                    desc: pi.desc.clone(),
                })
                .collect(),
            profile: None,
        }
    }
}

/// Rejects gaps between consecutive elements, or only logs them when not `strict`.
fn check_continuity(elements: &[HorizontalElement], strict: bool) -> Result<()> {
    for (i, pair) in elements.windows(2).enumerate() {
        let end = pair[0].end_point();
        let next = pair[1].start_point();
        if (end.x - next.x).abs() > CONTINUITY_TOLERANCE
            || (end.y - next.y).abs() > CONTINUITY_TOLERANCE
        {
            let reason = format!(
                "gap between elements {i} and {}: ({}, {}) to ({}, {})",
                i + 1,
                end.x,
                end.y,
                next.x,
                next.y
            );
            if strict {
                return Err(GeometryError::degenerate(reason));
            }
            log::warn!("{reason}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::alignment::{
        CurveData, ElementHeader, HorizontalElementData, LineData, StationEquationData,
    };
    use crate::geometry::Rotation;

    const CURVE_LENGTH: f64 = 50.0 * PI;

    /// East 100 m, quarter turn left on R100, north 100 m.
    fn data() -> AlignmentData {
        AlignmentData {
            name: Some("CL".into()),
            coord_geom: vec![
                HorizontalElementData::Line(LineData::between(
                    Point::new(0.0, 0.0),
                    Point::new(100.0, 0.0),
                )),
                HorizontalElementData::Curve(CurveData {
                    header: ElementHeader {
                        start: Some(Point::new(100.0, 0.0)),
                        end: Some(Point::new(200.0, 100.0)),
                        ..Default::default()
                    },
                    rot: Some(Rotation::Ccw),
                    center: Some(Point::new(100.0, 100.0)),
                    ..Default::default()
                }),
                HorizontalElementData::Line(LineData::between(
                    Point::new(200.0, 100.0),
                    Point::new(200.0, 200.0),
                )),
            ],
            ..Default::default()
        }
    }

    fn alignment() -> HorizontalAlignment {
        let _ = env_logger::builder().is_test(true).try_init();
        HorizontalAlignment::from_data(data()).unwrap()
    }

    fn close(a: Point, b: Point) -> bool {
        distance(a, b) < 1e-6
    }

    #[test]
    fn stations_are_assigned() {
        let a = alignment();
        let starts: Vec<f64> = a.elements().iter().filter_map(|e| e.sta_start()).collect();
        assert_eq!(starts.len(), 3);
        assert!((starts[1] - 100.0).abs() < 1e-9);
        assert!((starts[2] - (100.0 + CURVE_LENGTH)).abs() < 1e-9);
        assert!((a.sta_end() - (200.0 + CURVE_LENGTH)).abs() < 1e-9);
        assert_eq!(a.start_point(), Point::new(0.0, 0.0));
    }

    #[test]
    fn points_at_stations() {
        let a = alignment();
        assert!(close(a.point_at_station(50.0).unwrap(), Point::new(50.0, 0.0)));
        let half = 100.0 * (PI / 4.0).sin();
        let mid = a.point_at_station(100.0 + CURVE_LENGTH / 2.0).unwrap();
        assert!(close(mid, Point::new(100.0 + half, 100.0 - half)));
        assert!(close(a.point_at_station(a.sta_end()).unwrap(), Point::new(200.0, 200.0)));
        assert!(a.point_at_station(-0.1).unwrap_err().is_out_of_range());
        assert!(a.point_at_station(a.sta_end() + 0.1).is_err());
    }

    #[test]
    fn element_lookup_prefers_first() {
        let a = alignment();
        assert_eq!(a.element_at_station(100.0).map(|e| e.kind()), Some(ElementKind::Line));
        assert_eq!(a.element_at_station(150.0).map(|e| e.kind()), Some(ElementKind::Curve));
        assert!(a.element_at_station(1000.0).is_none());
    }

    #[test]
    fn station_offset_sign() {
        let a = alignment();
        let (station, offset) = a.station_offset(Point::new(50.0, 5.0)).unwrap();
        assert!((station - 50.0).abs() < 1e-9);
        assert!((offset + 5.0).abs() < 1e-9);

        let (_, offset) = a.station_offset(Point::new(50.0, -5.0)).unwrap();
        assert!((offset - 5.0).abs() < 1e-9);

        let (_, offset) = a.station_offset(Point::new(50.0, 0.0005)).unwrap();
        assert_eq!(offset, 0.0);
    }

    #[test]
    fn offset_points_follow_normal() {
        let a = alignment();
        let left = a.generate_offset_points(5.0, 50.0, Side::Left).unwrap();
        assert!(close(left[0].1, Point::new(0.0, 5.0)));
        let last = left.last().unwrap();
        assert!(close(last.1, Point::new(195.0, 200.0)));

        let right = a.generate_offset_points(5.0, 50.0, Side::Right).unwrap();
        assert!(close(right[1].1, Point::new(50.0, -5.0)));
        assert!(a.generate_offset_points(-1.0, 50.0, Side::Left).is_err());
    }

    #[test]
    fn sampled_points_include_end() {
        let a = alignment();
        let pts = a.generate_points(100.0).unwrap();
        let stations: Vec<f64> = pts.iter().map(|(s, _)| *s).collect();
        assert_eq!(stations.len(), 5);
        assert_eq!(&stations[..4], &[0.0, 100.0, 200.0, 300.0]);
        assert!((stations[4] - a.sta_end()).abs() < 1e-12);
        assert!(a.generate_points(0.0).is_err());
    }

    #[test]
    fn uniform_station_list() {
        let a = alignment();
        let stations = a
            .generate_stations(None, None, &StationIncrements::default(), true)
            .unwrap();
        assert_eq!(stations.len(), 38);
        assert_eq!(stations[0], 0.0);
        assert!(stations.iter().any(|s| (s - (100.0 + CURVE_LENGTH)).abs() < 1e-9));
        assert!((stations[37] - a.sta_end()).abs() < 1e-9);
        assert!(stations.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn station_list_per_element_type() {
        let a = alignment();
        let increments = StationIncrements {
            line: 50.0,
            curve: 25.0,
            spiral: 10.0,
        };
        let stations = a.generate_stations(None, None, &increments, true).unwrap();
        let expected = [
            0.0, 50.0, 100.0, 125.0, 150.0, 175.0, 200.0, 225.0, 250.0,
            100.0 + CURVE_LENGTH, 300.0, 350.0, 200.0 + CURVE_LENGTH,
        ];
        assert_eq!(stations.len(), expected.len());
        for (s, e) in stations.iter().zip(expected) {
            assert!((s - e).abs() < 1e-9, "{s} != {e}");
        }

        let without = a.generate_stations(Some(10.0), Some(60.0), &increments, false).unwrap();
        assert_eq!(without, vec![10.0, 50.0, 60.0]);
        assert!(a.generate_stations(Some(60.0), Some(10.0), &increments, true).is_err());
        assert!(a.generate_stations(None, Some(1e6), &increments, true).is_err());
        assert!(a
            .generate_stations(None, None, &StationIncrements::uniform(0.0), true)
            .is_err());
    }

    #[test]
    fn station_equation_shifts_display() {
        let mut d = data();
        d.sta_equation = vec![StationEquationData {
            sta_back: 150.0,
            sta_ahead: 1000.0,
            sta_internal: None,
            desc: None,
        }];
        let a = HorizontalAlignment::from_data(d).unwrap();
        let last_start = a.elements()[2].sta_start().unwrap();
        assert!((last_start - (1000.0 + CURVE_LENGTH - 50.0)).abs() < 1e-9);
        assert!((a.sta_end() - (1100.0 + CURVE_LENGTH - 50.0)).abs() < 1e-9);

        // Ahead station 1050 is internal station 200, 100 m into the curve.
        let on_curve = a.point_at_station(1050.0).unwrap();
        let Some(HorizontalElement::Curve(curve)) = a.elements().get(1) else {
            panic!("second element should be the curve");
        };
        assert!(close(on_curve, curve.point_at_distance(100.0).unwrap()));

        let (station, _) = a.station_offset(Point::new(210.0, 150.0)).unwrap();
        assert!((station - (last_start + 50.0)).abs() < 1e-9);
    }

    #[test]
    fn gaps_are_rejected_or_logged() {
        let mut d = data();
        if let HorizontalElementData::Line(line) = &mut d.coord_geom[2] {
            *line = LineData::between(Point::new(200.0, 101.0), Point::new(200.0, 200.0));
        }
        assert!(HorizontalAlignment::from_data(d.clone()).unwrap_err().is_degenerate());
        let (a, skipped) = HorizontalAlignment::from_data_lossy(d).unwrap();
        assert_eq!(a.elements().len(), 3);
        assert!(skipped.is_empty());
    }

    #[test]
    fn lossy_build_skips_bad_elements() {
        let mut d = data();
        d.coord_geom.push(HorizontalElementData::Curve(CurveData::default()));
        let err = HorizontalAlignment::from_data(d.clone()).unwrap_err();
        assert!(matches!(err, GeometryError::Element { index: 3, kind: "Curve", .. }));

        let (a, skipped) = HorizontalAlignment::from_data_lossy(d).unwrap();
        assert_eq!(a.elements().len(), 3);
        assert_eq!(skipped.len(), 1);
    }

    #[test]
    fn start_must_match_first_element() {
        let mut d = data();
        d.start = Some(Point::new(1.0, 0.0));
        assert!(HorizontalAlignment::from_data(d).unwrap_err().is_degenerate());
        assert!(HorizontalAlignment::from_data(AlignmentData::default()).is_err());
    }

    #[test]
    fn align_pis_get_stations() {
        let mut d = data();
        d.align_pis = vec![
            AlignPiData {
                station: None,
                point: Point::new(200.0, 0.0),
                desc: Some("PI 1".into()),
            },
            AlignPiData {
                station: Some(0.0),
                point: Point::new(0.0, 0.0),
                desc: None,
            },
        ];
        let a = HorizontalAlignment::from_data(d).unwrap();
        assert_eq!(a.align_pis()[0].station, Some(0.0));
        // The curve PI projects onto the middle of the arc.
        let pi = a.pi_at_station(100.0 + CURVE_LENGTH / 2.0, 1e-6).unwrap();
        assert_eq!(pi.desc.as_deref(), Some("PI 1"));
    }
}
