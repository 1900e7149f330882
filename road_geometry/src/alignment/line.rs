//! Straight tangent elements.

use serde::{Deserialize, Serialize};

use super::element::{check_distance, ElementHeader, ElementInfo, HorizontalGeometry};
use crate::error::{GeometryError, Result};
use crate::geometry::{Point, Side, Vector};

/// Input attributes of a LandXML `<Line>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineData {
    #[serde(flatten)]
    pub header: ElementHeader,
    /// Direction as a math angle; derived from Start/End when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
}

impl LineData {
    /// Line data from two points with everything else derived.
    pub fn between(start: Point, end: Point) -> Self {
        Self {
            header: ElementHeader {
                start: Some(start),
                end: Some(end),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Straight line between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    info: ElementInfo,
    direction: f64,
    length: f64,
}

impl Line {
    pub fn new(data: LineData) -> Result<Self> {
        let info = ElementInfo::resolve(data.header, "Line")?;
        let delta = info.start.to(info.end);
        let direction = data.dir.unwrap_or_else(|| delta.angle());
        let length = data.length.unwrap_or_else(|| delta.length());
        if length < 0.0 {
            return Err(GeometryError::NegativeLength(length));
        }
        Ok(Self {
            info,
            direction,
            length,
        })
    }

    /// Direction of travel as a math angle.
    pub fn direction(&self) -> f64 {
        self.direction
    }

    pub fn start_point(&self) -> Point {
        self.info.start
    }

    pub fn end_point(&self) -> Point {
        self.info.end
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

    pub fn to_data(&self) -> LineData {
        LineData {
            header: self.info.header(),
            dir: Some(self.direction),
            length: Some(self.length),
        }
    }
}

impl HorizontalGeometry for Line {
    fn length(&self) -> f64 {
        self.length
    }

    fn point_at_distance(&self, s: f64) -> Result<Point> {
        check_distance(s, self.length)?;
        Ok(self
            .info
            .start
            .offset(Vector::from_angle(self.direction), s))
    }

    fn orthogonal_at(&self, s: f64, side: Side) -> Result<(Point, Vector)> {
        let point = self.point_at_distance(s)?;
        let dir = Vector::from_angle(self.direction);
        let ortho = match side {
            Side::Left => dir.perp_left(),
            Side::Right => dir.perp_right(),
        };
        Ok((point, ortho))
    }

    fn project_point(&self, point: Point) -> Option<f64> {
        let dir = Vector::from_angle(self.direction);
        let s = self.info.start.to(point).dot(dir);
        if (0.0..=self.length).contains(&s) {
            Some(s)
        } else {
            None
        }
    }
}
