//! Horizontal geometry laid out from a chain of PIs.
//!
//! Every interior PI with a radius becomes an optional entry spiral, a
//! circular curve and an optional exit spiral; the remaining gaps are filled
//! with tangent lines.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{
    AlignPiData, AlignmentData, CurveData, ElementHeader, HorizontalAlignment,
    HorizontalElementData, LineData, SpiralData,
};
use crate::error::{GeometryError, Result};
use crate::geometry::{distance, fresnel_integrals, normalize_angle, Point, Rotation, Vector};

/// Shorter gaps than this are not filled with a line.
const MIN_SEGMENT: f64 = 1e-6;
/// Deflections below this leave the PI as a plain vertex.
const MIN_DEFLECTION: f64 = 1e-6;

/// One point of intersection of the tangent chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiData {
    pub point: Point,
    /// Curve radius; the PI stays a sharp vertex when absent or not positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spiral_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spiral_out: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl PiData {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            radius: None,
            spiral_in: None,
            spiral_out: None,
            desc: None,
        }
    }

    pub fn with_curve(point: Point, radius: f64) -> Self {
        Self {
            radius: Some(radius),
            ..Self::new(point)
        }
    }

    pub fn with_spirals(point: Point, radius: f64, spiral_in: f64, spiral_out: f64) -> Self {
        Self {
            point,
            radius: Some(radius),
            spiral_in: Some(spiral_in),
            spiral_out: Some(spiral_out),
            desc: None,
        }
    }
}

impl HorizontalAlignment {
    /// Lays out lines, spirals and curves through `pis`.
    ///
    /// The first and last PI are the alignment ends. The PIs are kept as the
    /// alignment PIs.
    pub fn from_pis(name: Option<String>, sta_start: f64, pis: &[PiData]) -> Result<Self> {
        if pis.len() < 2 {
            return Err(GeometryError::InsufficientPoints {
                required: 2,
                actual: pis.len(),
            });
        }

        let mut coord_geom = Vec::new();
        let mut cursor = pis[0].point;
        for (i, window) in pis.windows(3).enumerate() {
            let (prev, pi, next) = (&window[0], &window[1], &window[2]);
            let layout = curve_layout(prev.point, cursor, pi, next.point)
                .map_err(|e| e.in_element(i + 1, "PI"))?;
            match layout {
                Some(layout) => {
                    push_line(&mut coord_geom, cursor, layout.start);
                    cursor = layout.end;
                    coord_geom.extend(layout.elements);
                }
                None => {
                    push_line(&mut coord_geom, cursor, pi.point);
                    cursor = pi.point;
                }
            }
        }
        if let Some(last) = pis.last() {
            push_line(&mut coord_geom, cursor, last.point);
        }

        Self::from_data(AlignmentData {
            name,
            sta_start: Some(sta_start),
            coord_geom,
            align_pis: pis
                .iter()
                .map(|pi| AlignPiData {
                    station: None,
                    point: pi.point,
                    desc: pi.desc.clone(),
                })
                .collect(),
            ..Default::default()
        })
    }
}

fn push_line(elements: &mut Vec<HorizontalElementData>, start: Point, end: Point) {
    if distance(start, end) > MIN_SEGMENT {
        elements.push(HorizontalElementData::Line(LineData::between(start, end)));
    }
}

/// Elements laid out around one PI, from TS to ST.
struct CurveLayout {
    elements: Vec<HorizontalElementData>,
    start: Point,
    end: Point,
}

/// End of a clothoid from infinite radius to `radius` over `length`, in the
/// frame of its tangent point, turning left.
fn clothoid_end(length: f64, radius: f64) -> (f64, f64) {
    let a = (radius * length).sqrt() * PI.sqrt();
    let (s, c) = fresnel_integrals(length / a);
    (a * c, a * s)
}

/// Transition data of one spiral: end coordinates, deflection, shift `p`,
/// tangent offset `k` and long tangent.
struct Transition {
    length: f64,
    x: f64,
    y: f64,
    theta: f64,
    p: f64,
    k: f64,
    long_tangent: f64,
}

impl Transition {
    fn new(length: f64, radius: f64) -> Self {
        if length <= 0.0 {
            return Self {
                length: 0.0,
                x: 0.0,
                y: 0.0,
                theta: 0.0,
                p: 0.0,
                k: 0.0,
                long_tangent: 0.0,
            };
        }
        let (x, y) = clothoid_end(length, radius);
        let theta = length / (2.0 * radius);
        Self {
            length,
            x,
            y,
            theta,
            p: y - radius * (1.0 - theta.cos()),
            k: x - radius * theta.sin(),
            long_tangent: x - y / theta.tan(),
        }
    }
}

fn unit(from: Point, to: Point) -> Result<Vector> {
    from.to(to)
        .normalized(MIN_SEGMENT)
        .ok_or_else(|| GeometryError::degenerate(format!("PIs ({}, {}) coincide", to.x, to.y)))
}

/// Spiral, curve, spiral for the PI at `pi` on the tangents `prev -> pi -> to`.
/// The incoming tangent line is only free from `cursor` on. `None` when the
/// PI has no curve.
fn curve_layout(prev: Point, cursor: Point, pi: &PiData, to: Point) -> Result<Option<CurveLayout>> {
    let u_in = unit(prev, pi.point)?;
    let u_out = unit(pi.point, to)?;
    let radius = match pi.radius {
        Some(r) if r > 0.0 => r,
        _ => return Ok(None),
    };
    let dir_in = u_in.angle();
    let dir_out = u_out.angle();
    let deflection = normalize_angle(dir_out - dir_in);
    if deflection.abs() < MIN_DEFLECTION {
        return Ok(None);
    }
    if deflection.abs() > PI - MIN_DEFLECTION {
        return Err(GeometryError::degenerate("tangents reverse direction at the PI"));
    }
    let rotation = if deflection > 0.0 {
        Rotation::Ccw
    } else {
        Rotation::Cw
    };
    let sign = rotation.sign();

    let entry = Transition::new(pi.spiral_in.unwrap_or(0.0), radius);
    let exit = Transition::new(pi.spiral_out.unwrap_or(0.0), radius);
    let delta_curve = deflection.abs() - entry.theta - exit.theta;
    if delta_curve < 0.0 {
        return Err(GeometryError::invalid(
            "spiral",
            format!(
                "spirals turn {:.6} rad, more than the deflection of {:.6} rad",
                entry.theta + exit.theta,
                deflection.abs()
            ),
        ));
    }

    // Center sits R + p off each tangent, on the inside of the turn.
    let n_in = u_in.perp_left();
    let n_out = u_out.perp_left();
    let (b1, b2) = (sign * (radius + entry.p), sign * (radius + exit.p));
    let det = n_in.cross(n_out);
    let d = Vector::new(
        (b1 * n_out.y - n_in.y * b2) / det,
        (n_in.x * b2 - n_out.x * b1) / det,
    );
    let center = pi.point.offset(d, 1.0);

    let tangent_in = entry.k - d.dot(u_in);
    let tangent_out = exit.k + d.dot(u_out);
    if tangent_in > distance(cursor, pi.point) + MIN_SEGMENT {
        return Err(GeometryError::degenerate(format!(
            "entry tangent {tangent_in:.3} is longer than the incoming tangent line"
        )));
    }
    if tangent_out > distance(pi.point, to) + MIN_SEGMENT {
        return Err(GeometryError::degenerate(format!(
            "exit tangent {tangent_out:.3} is longer than the outgoing tangent line"
        )));
    }

    let ts = pi.point.offset(u_in, -tangent_in);
    let st = pi.point.offset(u_out, tangent_out);
    let sc = ts.from_local(dir_in, entry.x, sign * entry.y);
    let cs = st.from_local(dir_out + PI, exit.x, -sign * exit.y);

    let mut elements = Vec::with_capacity(3);
    if entry.length > 0.0 {
        elements.push(HorizontalElementData::Spiral(SpiralData {
            header: header(ts, sc),
            length: Some(entry.length),
            radius_start: Some(f64::INFINITY),
            radius_end: Some(radius),
            rot: Some(rotation),
            pi: Some(ts.offset(u_in, entry.long_tangent)),
            dir_start: Some(dir_in),
            ..Default::default()
        }));
    }
    if delta_curve * radius > MIN_SEGMENT {
        elements.push(HorizontalElementData::Curve(CurveData {
            header: header(sc, cs),
            rot: Some(rotation),
            center: Some(center),
            delta: Some(delta_curve),
            ..Default::default()
        }));
    }
    if exit.length > 0.0 {
        elements.push(HorizontalElementData::Spiral(SpiralData {
            header: header(cs, st),
            length: Some(exit.length),
            radius_start: Some(radius),
            radius_end: Some(f64::INFINITY),
            rot: Some(rotation),
            pi: Some(st.offset(u_out, -exit.long_tangent)),
            dir_start: Some(dir_out - sign * exit.theta),
            ..Default::default()
        }));
    }
    log::debug!(
        "PI ({:.3}, {:.3}): R={radius} deflection={deflection:.6} T1={tangent_in:.3} T2={tangent_out:.3}",
        pi.point.x,
        pi.point.y
    );
    Ok(Some(CurveLayout {
        elements,
        start: ts,
        end: st,
    }))
}

fn header(start: Point, end: Point) -> ElementHeader {
    ElementHeader {
        start: Some(start),
        end: Some(end),
        ..Default::default()
    }
}
