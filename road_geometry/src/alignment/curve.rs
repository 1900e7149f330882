//! Circular arc elements.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use super::element::{check_distance, ElementHeader, ElementInfo, HorizontalGeometry};
use crate::error::{GeometryError, Result};
use crate::geometry::{distance, Point, Rotation, Side, Vector};

/// LandXML `crvType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    #[default]
    Arc,
    Chord,
}

/// Input attributes of a LandXML `<Curve>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveData {
    #[serde(flatten)]
    pub header: ElementHeader,
    #[serde(default)]
    pub rot: Option<Rotation>,
    #[serde(rename = "Center", default)]
    pub center: Option<Point>,
    #[serde(rename = "PI", default, skip_serializing_if = "Option::is_none")]
    pub pi: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv_type: Option<CurveType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chord: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir_start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir_end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid_ord: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tangent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<f64>,
}

/// Circular arc defined by start, center, end and rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    info: ElementInfo,
    center: Point,
    rotation: Rotation,
    curve_type: CurveType,
    radius: f64,
    /// Central angle, always positive.
    delta: f64,
    length: f64,
    dir_start: f64,
    dir_end: f64,
    pi: Option<Point>,
    /// One PI per half-arc when `delta >= PI`, otherwise a single PI.
    pi_points: Vec<Point>,
    chord: f64,
    tangent: f64,
    mid_ordinate: f64,
    external: f64,
}

impl Curve {
    pub fn new(data: CurveData) -> Result<Self> {
        let info = ElementInfo::resolve(data.header, "Curve")?;
        let rotation = data.rot.ok_or(GeometryError::missing("Curve", "rot"))?;
        let center = data
            .center
            .ok_or(GeometryError::missing("Curve", "Center"))?;

        let radius = distance(center, info.start);
        if radius <= 0.0 {
            return Err(GeometryError::degenerate("curve start point equals its center"));
        }

        let start_angle = center.to(info.start).angle();
        let delta = data.delta.unwrap_or_else(|| {
            let end_angle = center.to(info.end).angle();
            let mut delta = end_angle - start_angle;
            match rotation {
                Rotation::Cw if delta > 0.0 => delta -= TAU,
                Rotation::Ccw if delta < 0.0 => delta += TAU,
                _ => {}
            }
            delta.abs()
        });
        let length = data.length.unwrap_or(radius * delta);
        if length < 0.0 {
            return Err(GeometryError::NegativeLength(length));
        }
        let dir_start = data
            .dir_start
            .unwrap_or(start_angle + rotation.sign() * FRAC_PI_2);
        let dir_end = data.dir_end.unwrap_or(dir_start + rotation.sign() * delta);
        let half = delta / 2.0;

        let mut curve = Self {
            info,
            center,
            rotation,
            curve_type: data.crv_type.unwrap_or_default(),
            radius,
            delta,
            length,
            dir_start,
            dir_end,
            pi: data.pi,
            pi_points: Vec::new(),
            chord: data.chord.unwrap_or(2.0 * radius * half.sin()),
            tangent: data.tangent.unwrap_or(radius * half.tan()),
            mid_ordinate: data.mid_ord.unwrap_or(radius * (1.0 - half.cos())),
            external: data.external.unwrap_or(radius * (1.0 / half.cos() - 1.0)),
        };
        curve.pi_points = curve.compute_pi_points();
        if curve.pi.is_none() {
            curve.pi = curve.pi_points.first().copied();
        }
        Ok(curve)
    }

    fn start_angle(&self) -> f64 {
        self.center.to(self.info.start).angle()
    }

    /// Radial angle of the point at distance `s`.
    fn angle_at(&self, s: f64) -> f64 {
        self.start_angle() + self.rotation.sign() * s / self.radius
    }

    fn compute_pi_points(&self) -> Vec<Point> {
        let ends = if self.delta >= PI {
            let mid = self
                .center
                .offset(Vector::from_angle(self.angle_at(self.length / 2.0)), self.radius);
            vec![(self.info.start, mid), (mid, self.info.end)]
        } else {
            vec![(self.info.start, self.info.end)]
        };
        ends.into_iter()
            .filter_map(|(a, b)| self.tangent_intersection(a, b))
            .collect()
    }

    /// Intersection of the tangents at two points of the arc; `None` when
    /// the tangents are parallel.
    fn tangent_intersection(&self, p1: Point, p2: Point) -> Option<Point> {
        let quarter = self.rotation.sign() * FRAC_PI_2;
        let t1 = Vector::from_angle(self.center.to(p1).angle() + quarter);
        let t2 = Vector::from_angle(self.center.to(p2).angle() + quarter);
        let denom = t1.cross(t2);
        if denom.abs() < 1e-10 {
            return None;
        }
        let d = p1.to(p2);
        let u = d.cross(t2) / denom;
        Some(p1.offset(t1, u))
    }

    pub fn start_point(&self) -> Point {
        self.info.start
    }

    pub fn end_point(&self) -> Point {
        self.info.end
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn dir_start(&self) -> f64 {
        self.dir_start
    }

    pub fn dir_end(&self) -> f64 {
        self.dir_end
    }

    pub fn pi_points(&self) -> &[Point] {
        &self.pi_points
    }

    pub fn chord(&self) -> f64 {
        self.chord
    }

    pub fn tangent_length(&self) -> f64 {
        self.tangent
    }

    pub fn mid_ordinate(&self) -> f64 {
        self.mid_ordinate
    }

    pub fn external(&self) -> f64 {
        self.external
    }

    pub fn name(&self) -> Option<&str> {
        self.info.name.as_deref()
    }

    pub fn sta_start(&self) -> Option<f64> {
        self.info.sta_start
    }

    pub fn sta_end(&self) -> Option<f64> {
        self.info.sta_start.map(|s| s + self.length)
    }

    pub(crate) fn set_sta_start(&mut self, station: f64) {
        self.info.sta_start = Some(station);
    }

    pub fn to_data(&self) -> CurveData {
        CurveData {
            header: self.info.header(),
            rot: Some(self.rotation),
            center: Some(self.center),
            pi: self.pi,
            crv_type: Some(self.curve_type),
            radius: Some(self.radius),
            chord: Some(self.chord),
            delta: Some(self.delta),
            dir_start: Some(self.dir_start),
            dir_end: Some(self.dir_end),
            length: Some(self.length),
            mid_ord: Some(self.mid_ordinate),
            tangent: Some(self.tangent),
            external: Some(self.external),
        }
    }
}

impl HorizontalGeometry for Curve {
    fn length(&self) -> f64 {
        self.length
    }

    fn point_at_distance(&self, s: f64) -> Result<Point> {
        check_distance(s, self.length)?;
        Ok(self
            .center
            .offset(Vector::from_angle(self.angle_at(s)), self.radius))
    }

    fn orthogonal_at(&self, s: f64, side: Side) -> Result<(Point, Vector)> {
        let point = self.point_at_distance(s)?;
        let tangent = self.angle_at(s) + self.rotation.sign() * FRAC_PI_2;
        let ortho = match side {
            Side::Left => tangent + FRAC_PI_2,
            Side::Right => tangent - FRAC_PI_2,
        };
        Ok((point, Vector::from_angle(ortho)))
    }

    fn project_point(&self, point: Point) -> Option<f64> {
        let mut diff = self.center.to(point).angle() - self.start_angle();
        let swept = match self.rotation {
            Rotation::Cw => {
                if diff > 0.0 {
                    diff -= TAU;
                }
                diff.abs()
            }
            Rotation::Ccw => {
                if diff < 0.0 {
                    diff += TAU;
                }
                diff
            }
        };
        if swept > self.delta {
            return None;
        }
        Some(self.radius * swept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quarter circle of radius 100 turning left from (0,0) heading +X.
    fn quarter_ccw() -> Curve {
        Curve::new(CurveData {
            header: ElementHeader {
                start: Some(Point::new(0.0, 0.0)),
                end: Some(Point::new(100.0, 100.0)),
                ..Default::default()
            },
            rot: Some(Rotation::Ccw),
            center: Some(Point::new(0.0, 100.0)),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn derived_values() {
        let c = quarter_ccw();
        assert!((c.radius() - 100.0).abs() < 1e-12);
        assert!((c.delta() - FRAC_PI_2).abs() < 1e-12);
        assert!((c.length() - 50.0 * PI).abs() < 1e-9);
        assert!(c.dir_start().abs() < 1e-12);
        assert!((c.dir_end() - FRAC_PI_2).abs() < 1e-12);
        assert!((c.tangent_length() - 100.0).abs() < 1e-9);
        assert!((c.chord() - 100.0 * 2f64.sqrt()).abs() < 1e-9);
        let pi = c.pi_points()[0];
        assert!((pi.x - 100.0).abs() < 1e-9);
        assert!(pi.y.abs() < 1e-9);
    }

    #[test]
    fn points_follow_the_arc() {
        let c = quarter_ccw();
        let end = c.point_at_distance(c.length()).unwrap();
        assert!(distance(end, c.end_point()) < 1e-9);
        let mid = c.point_at_distance(c.length() / 2.0).unwrap();
        assert!((distance(mid, c.center()) - 100.0).abs() < 1e-9);
        assert!(c.point_at_distance(c.length() + 1.0).is_err());
    }

    #[test]
    fn clockwise_arc_turns_right() {
        let c = Curve::new(CurveData {
            header: ElementHeader {
                start: Some(Point::new(0.0, 0.0)),
                end: Some(Point::new(100.0, -100.0)),
                ..Default::default()
            },
            rot: Some(Rotation::Cw),
            center: Some(Point::new(0.0, -100.0)),
            ..Default::default()
        })
        .unwrap();
        assert!((c.delta() - FRAC_PI_2).abs() < 1e-12);
        let p = c.point_at_distance(10.0).unwrap();
        assert!(p.y < 0.0);
        let (_, left) = c.orthogonal_at(0.0, Side::Left).unwrap();
        assert!((left.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn left_normal_points_to_center_for_ccw() {
        let c = quarter_ccw();
        let (p, left) = c.orthogonal_at(30.0, Side::Left).unwrap();
        let to_center = p.to(c.center()).normalized(1e-10).unwrap();
        assert!((left.dot(to_center) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn large_arc_has_two_pis() {
        let c = Curve::new(CurveData {
            header: ElementHeader {
                start: Some(Point::new(0.0, 0.0)),
                end: Some(Point::new(0.0, 200.0)),
                ..Default::default()
            },
            rot: Some(Rotation::Ccw),
            center: Some(Point::new(0.0, 100.0)),
            ..Default::default()
        })
        .unwrap();
        assert!((c.delta() - PI).abs() < 1e-12);
        assert_eq!(c.pi_points().len(), 2);
    }

    #[test]
    fn projection() {
        let c = quarter_ccw();
        let s = c.project_point(Point::new(100.0, 0.0)).unwrap();
        assert!((s - c.length() / 2.0).abs() < 1e-9);
        assert!(c.project_point(Point::new(-50.0, 100.0)).is_none());
    }

    #[test]
    fn requires_center_and_rotation() {
        let mut data = quarter_ccw().to_data();
        data.center = None;
        assert_eq!(
            Curve::new(data).unwrap_err(),
            GeometryError::missing("Curve", "Center")
        );
        let mut data = quarter_ccw().to_data();
        data.rot = None;
        assert!(Curve::new(data).is_err());
    }
}
