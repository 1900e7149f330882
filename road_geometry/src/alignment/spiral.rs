//! Clothoid transition spirals.
//!
//! A spiral is evaluated in a local frame whose origin is the narrow
//! (larger radius) end and whose +X axis is the tangent there. When the
//! radius grows along the direction of travel the frame sits at the end
//! point, pointing backwards, and distances are mirrored.
//!
//! Spirals with both radii finite are evaluated as a sub-segment of one
//! virtual clothoid that starts at infinite radius.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::element::{check_distance, ElementHeader, ElementInfo, HorizontalGeometry};
use crate::error::{GeometryError, Result};
use crate::geometry::{fresnel_integrals, Point, Rotation, Side, Vector};

/// Step used for the numerical tangent.
pub const DIFF_STEP: f64 = 1e-6;
/// Shortest numerical tangent accepted before the point is treated as degenerate.
pub const MIN_TANGENT: f64 = 1e-10;

const COARSE_SAMPLES: usize = 50;
const REFINE_ITERATIONS: usize = 60;
const REFINE_TOLERANCE: f64 = 1e-7;

/// LandXML `spiType`. Every type is evaluated as a clothoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpiralType {
    #[default]
    Clothoid,
    Bloss,
    Cosine,
    Sine,
    Biquadratic,
}

/// Radii serialize infinity as `"INF"`, the LandXML spelling.
mod radius {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(r) if r.is_infinite() => serializer.serialize_str("INF"),
            Some(r) => serializer.serialize_f64(*r),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(r)) => Ok(Some(r)),
            Some(Raw::Text(s)) => match s.trim().to_ascii_uppercase().as_str() {
                "INF" | "INFINITY" => Ok(Some(f64::INFINITY)),
                other => other
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| serde::de::Error::custom(format!("invalid radius '{s}'"))),
            },
        }
    }
}

/// Input attributes of a LandXML `<Spiral>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpiralData {
    #[serde(flatten)]
    pub header: ElementHeader,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default, with = "radius")]
    pub radius_start: Option<f64>,
    #[serde(default, with = "radius")]
    pub radius_end: Option<f64>,
    #[serde(default)]
    pub rot: Option<Rotation>,
    #[serde(rename = "PI", default)]
    pub pi: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spi_type: Option<SpiralType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir_start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir_end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tan_long: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tan_short: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chord: Option<f64>,
}

/// Clothoid spiral between two radii.
#[derive(Debug, Clone, PartialEq)]
pub struct Spiral {
    info: ElementInfo,
    pi: Point,
    length: f64,
    radius_start: f64,
    radius_end: f64,
    rotation: Rotation,
    spiral_type: SpiralType,
    /// Clothoid parameter `A`.
    constant: f64,
    /// Total deflection.
    theta: f64,
    dir_start: f64,
    dir_end: f64,
    total_x: f64,
    total_y: f64,
    tan_long: f64,
    tan_short: f64,
    chord: f64,
}

impl Spiral {
    pub fn new(data: SpiralData) -> Result<Self> {
        let info = ElementInfo::resolve(data.header, "Spiral")?;
        let length = data.length.ok_or(GeometryError::missing("Spiral", "length"))?;
        let radius_start = data
            .radius_start
            .ok_or(GeometryError::missing("Spiral", "radiusStart"))?;
        let radius_end = data
            .radius_end
            .ok_or(GeometryError::missing("Spiral", "radiusEnd"))?;
        let rotation = data.rot.ok_or(GeometryError::missing("Spiral", "rot"))?;
        let pi = data.pi.ok_or(GeometryError::missing("Spiral", "PI"))?;

        if length < 0.0 {
            return Err(GeometryError::NegativeLength(length));
        }
        if length == 0.0 {
            return Err(GeometryError::degenerate("spiral has zero length"));
        }
        for (field, r) in [("radiusStart", radius_start), ("radiusEnd", radius_end)] {
            if r.is_nan() || r <= 0.0 {
                return Err(GeometryError::invalid(field, format!("radius must be positive, got {r}")));
            }
        }
        let compound = match (radius_start.is_infinite(), radius_end.is_infinite()) {
            (true, true) => {
                return Err(GeometryError::invalid(
                    "radiusStart",
                    "start and end radius cannot both be infinite",
                ))
            }
            (false, false) => true,
            _ => false,
        };
        if compound && radius_start == radius_end {
            return Err(GeometryError::degenerate("spiral start and end radius are equal"));
        }

        let constant = data.constant.unwrap_or_else(|| {
            if compound {
                (radius_start * radius_end * length / (radius_start - radius_end).abs()).sqrt()
            } else {
                (radius_start.min(radius_end) * length).sqrt()
            }
        });
        let theta = if compound {
            length * (1.0 / radius_start + 1.0 / radius_end) / 2.0
        } else {
            length / (2.0 * radius_start.min(radius_end))
        };
        let dir_start = match data.dir_start {
            Some(dir) => dir,
            None => {
                if pi == info.start {
                    return Err(GeometryError::degenerate("spiral Start and PI are identical"));
                }
                info.start.to(pi).angle()
            }
        };
        let dir_end = dir_start + theta * rotation.sign();

        let mut spiral = Self {
            info,
            pi,
            length,
            radius_start,
            radius_end,
            rotation,
            spiral_type: data.spi_type.unwrap_or_default(),
            constant,
            theta,
            dir_start,
            dir_end,
            total_x: 0.0,
            total_y: 0.0,
            tan_long: 0.0,
            tan_short: 0.0,
            chord: 0.0,
        };

        let (end_x, end_y) = spiral.local_point(length);
        spiral.total_x = data.total_x.unwrap_or(end_x);
        spiral.total_y = data.total_y.unwrap_or(end_y);
        spiral.tan_long = data.tan_long.unwrap_or(end_x);
        spiral.tan_short = data.tan_short.unwrap_or(end_y);
        spiral.chord = data.chord.unwrap_or(end_x.hypot(end_y));

        log::debug!(
            "spiral {:?}: A={:.4} theta={:.6} reversed={} compound={}",
            spiral.info.name,
            constant,
            theta,
            spiral.is_reversed(),
            compound
        );
        Ok(spiral)
    }

    /// True when the radius grows along the direction of travel.
    fn is_reversed(&self) -> bool {
        self.radius_end > self.radius_start
    }

    fn is_compound(&self) -> bool {
        self.radius_start.is_finite() && self.radius_end.is_finite()
    }

    /// Origin and x-axis angle of the local frame.
    fn reference_frame(&self) -> (Point, f64) {
        if self.is_reversed() {
            (self.info.end, self.dir_end + PI)
        } else {
            (self.info.start, self.dir_start)
        }
    }

    /// Local distance from the frame origin for a distance from the start.
    fn local_distance(&self, s: f64) -> f64 {
        if self.is_reversed() {
            self.length - s
        } else {
            s
        }
    }

    fn local_point(&self, l: f64) -> (f64, f64) {
        if self.is_compound() {
            self.compound_point(l)
        } else {
            self.clothoid_point(l)
        }
    }

    fn clothoid_point(&self, l: f64) -> (f64, f64) {
        let mut sign = self.rotation.sign();
        if self.is_reversed() {
            sign = -sign;
        }
        let a = self.constant * PI.sqrt();
        let (s, c) = fresnel_integrals(l / a);
        (a * c, a * s * sign)
    }

    fn compound_point(&self, l: f64) -> (f64, f64) {
        let mut sign = self.rotation.sign();
        let (mut r1, mut r2) = (self.radius_start, self.radius_end);
        if r2 > r1 {
            std::mem::swap(&mut r1, &mut r2);
            sign = -sign;
        }
        let a2 = self.constant * self.constant;
        let s1 = a2 / r1;
        let s2 = a2 / r2;
        let s = s1 + (l / self.length) * (s2 - s1);

        let (x2, y2) = self.clothoid_point(s);
        let (x1, y1) = self.clothoid_point(s1);
        let (dx, dy) = (x2 - x1, y2 - y1);

        // Undo the virtual clothoid's heading at s1.
        let (sin_p, cos_p) = (sign * s1 * s1 / (2.0 * a2)).sin_cos();
        (dx * cos_p + dy * sin_p, -dx * sin_p + dy * cos_p)
    }

    /// Signed curvature at `s` (positive turning left).
    pub fn curvature_at(&self, s: f64) -> Result<f64> {
        check_distance(s, self.length)?;
        let k0 = 1.0 / self.radius_start;
        let k1 = 1.0 / self.radius_end;
        Ok(self.rotation.sign() * (k0 + (k1 - k0) * s / self.length))
    }

    pub fn start_point(&self) -> Point {
        self.info.start
    }

    pub fn end_point(&self) -> Point {
        self.info.end
    }

    pub fn pi_point(&self) -> Point {
        self.pi
    }

    pub fn radius_start(&self) -> f64 {
        self.radius_start
    }

    pub fn radius_end(&self) -> f64 {
        self.radius_end
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn spiral_type(&self) -> SpiralType {
        self.spiral_type
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn dir_start(&self) -> f64 {
        self.dir_start
    }

    pub fn dir_end(&self) -> f64 {
        self.dir_end
    }

    /// Local coordinates of the far end of the frame.
    pub fn total_x(&self) -> f64 {
        self.total_x
    }

    pub fn total_y(&self) -> f64 {
        self.total_y
    }

    pub fn tan_long(&self) -> f64 {
        self.tan_long
    }

    pub fn tan_short(&self) -> f64 {
        self.tan_short
    }

    pub fn chord(&self) -> f64 {
        self.chord
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

    pub fn to_data(&self) -> SpiralData {
        SpiralData {
            header: self.info.header(),
            length: Some(self.length),
            radius_start: Some(self.radius_start),
            radius_end: Some(self.radius_end),
            rot: Some(self.rotation),
            pi: Some(self.pi),
            spi_type: Some(self.spiral_type),
            constant: Some(self.constant),
            dir_start: Some(self.dir_start),
            dir_end: Some(self.dir_end),
            theta: Some(self.theta),
            total_x: Some(self.total_x),
            total_y: Some(self.total_y),
            tan_long: Some(self.tan_long),
            tan_short: Some(self.tan_short),
            chord: Some(self.chord),
        }
    }
}

impl HorizontalGeometry for Spiral {
    fn length(&self) -> f64 {
        self.length
    }

    fn point_at_distance(&self, s: f64) -> Result<Point> {
        check_distance(s, self.length)?;
        let (x, y) = self.local_point(self.local_distance(s));
        let (origin, angle) = self.reference_frame();
        Ok(origin.from_local(angle, x, y))
    }

    fn orthogonal_at(&self, s: f64, side: Side) -> Result<(Point, Vector)> {
        check_distance(s, self.length)?;
        let l = self.local_distance(s);
        let (x, y) = self.local_point(l);
        let (origin, angle) = self.reference_frame();
        let point = origin.from_local(angle, x, y);

        let before = if l - DIFF_STEP >= 0.0 {
            self.local_point(l - DIFF_STEP)
        } else {
            (x, y)
        };
        let after = if l + DIFF_STEP <= self.length {
            self.local_point(l + DIFF_STEP)
        } else {
            (x, y)
        };
        let tangent = Vector::new(after.0 - before.0, after.1 - before.1)
            .normalized(MIN_TANGENT)
            .ok_or_else(|| {
                GeometryError::degenerate(format!("cannot determine spiral tangent at {s}"))
            })?
            .rotate(angle);
        // The local tangent runs against travel in a reversed frame.
        let tangent = if self.is_reversed() { -tangent } else { tangent };

        let ortho = match side {
            Side::Left => tangent.perp_left(),
            Side::Right => tangent.perp_right(),
        };
        Ok((point, ortho))
    }

    /// Nearest point search; always resolves to a distance in `[0, length]`.
    fn project_point(&self, point: Point) -> Option<f64> {
        let (origin, angle) = self.reference_frame();
        let (px, py) = origin.into_local(angle, point);
        let dist2 = |l: f64| {
            let (x, y) = self.local_point(l);
            (x - px).powi(2) + (y - py).powi(2)
        };

        let step = self.length / COARSE_SAMPLES as f64;
        let i_min = (0..=COARSE_SAMPLES)
            .map(|i| (i, dist2(i as f64 * step)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)?;
        let (mut a, mut b) = match i_min {
            0 => (0.0, step),
            i if i == COARSE_SAMPLES => (self.length - step, self.length),
            i => ((i - 1) as f64 * step, (i + 1) as f64 * step),
        };

        for _ in 0..REFINE_ITERATIONS {
            let m1 = a + (b - a) * 0.25;
            let m2 = a + (b - a) * 0.5;
            let m3 = a + (b - a) * 0.75;
            let (f1, f2, f3) = (dist2(m1), dist2(m2), dist2(m3));
            if f1 < f2 {
                b = m2;
            } else if f3 < f2 {
                a = m2;
            } else {
                a = m1;
                b = m3;
            }
            if b - a < REFINE_TOLERANCE {
                break;
            }
        }

        let local = ((a + b) / 2.0).clamp(0.0, self.length);
        Some(self.local_distance(local))
    }
}
