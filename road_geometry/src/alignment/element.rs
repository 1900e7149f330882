//! Shared pieces of the horizontal element types.

use serde::{Deserialize, Serialize};

use crate::error::{check_step, GeometryError, Result};
use crate::geometry::{Point, Side, Vector};

/// Attributes every LandXML horizontal element carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(rename = "staStart", default, skip_serializing_if = "Option::is_none")]
    pub sta_start: Option<f64>,
    #[serde(rename = "Start", default)]
    pub start: Option<Point>,
    #[serde(rename = "End", default)]
    pub end: Option<Point>,
}

/// Validated form of [`ElementHeader`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ElementInfo {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub sta_start: Option<f64>,
    pub start: Point,
    pub end: Point,
}

impl ElementInfo {
    pub fn resolve(header: ElementHeader, element: &'static str) -> Result<Self> {
        let start = header
            .start
            .ok_or(GeometryError::missing(element, "Start"))?;
        let end = header.end.ok_or(GeometryError::missing(element, "End"))?;
        Ok(Self {
            name: header.name,
            desc: header.desc,
            sta_start: header.sta_start,
            start,
            end,
        })
    }

    pub fn header(&self) -> ElementHeader {
        ElementHeader {
            name: self.name.clone(),
            desc: self.desc.clone(),
            sta_start: self.sta_start,
            start: Some(self.start),
            end: Some(self.end),
        }
    }
}

/// Contract shared by the horizontal element variants.
///
/// Distances are measured along the element from its start point and must
/// lie in `[0, length]`.
pub trait HorizontalGeometry {
    /// Element length along the curve.
    fn length(&self) -> f64;

    /// Coordinates at distance `s` from the start.
    fn point_at_distance(&self, s: f64) -> Result<Point>;

    /// Point at `s` and the unit vector perpendicular to the element,
    /// pointing to `side`.
    fn orthogonal_at(&self, s: f64, side: Side) -> Result<(Point, Vector)>;

    /// Distance along the element of the closest point to `point`, or
    /// `None` when the projection falls outside the element.
    fn project_point(&self, point: Point) -> Option<f64>;

    /// Points at `0, step, 2*step, ...` followed by the exact end point.
    fn generate_points(&self, step: f64) -> Result<Vec<Point>> {
        sample_distances(self.length(), step)?
            .into_iter()
            .map(|s| self.point_at_distance(s))
            .collect()
    }
}

/// Fails unless `0 <= s <= length`.
pub(crate) fn check_distance(s: f64, length: f64) -> Result<()> {
    if (0.0..=length).contains(&s) {
        Ok(())
    } else {
        Err(GeometryError::out_of_range(s, 0.0, length))
    }
}

/// Sampling distances for [`HorizontalGeometry::generate_points`].
pub(crate) fn sample_distances(length: f64, step: f64) -> Result<Vec<f64>> {
    check_step(step)?;
    let mut out = Vec::new();
    let mut i = 0usize;
    loop {
        let s = i as f64 * step;
        if s >= length {
            break;
        }
        out.push(s);
        i += 1;
    }
    out.push(length);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_always_ends_at_length() {
        let d = sample_distances(100.0, 30.0).unwrap();
        assert_eq!(d, vec![0.0, 30.0, 60.0, 90.0, 100.0]);

        let d = sample_distances(100.0, 25.0).unwrap();
        assert_eq!(d, vec![0.0, 25.0, 50.0, 75.0, 100.0]);

        let d = sample_distances(0.0, 1.0).unwrap();
        assert_eq!(d, vec![0.0]);
    }

    #[test]
    fn sampling_rejects_bad_step() {
        assert!(sample_distances(10.0, 0.0).is_err());
        assert!(sample_distances(10.0, -1.0).is_err());
    }

    #[test]
    fn header_requires_start_and_end() {
        let header = ElementHeader {
            start: Some(Point::new(0.0, 0.0)),
            ..Default::default()
        };
        let err = ElementInfo::resolve(header, "Line").unwrap_err();
        assert_eq!(err, GeometryError::missing("Line", "End"));
    }
}
