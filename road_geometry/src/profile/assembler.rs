//! Stitches PVIs and vertical curve definitions into a contiguous list of
//! vertical elements.
//!
//! Curves that cannot be placed are reported as [`AssemblyWarning`]s and the
//! span they would have covered falls back to straight grade lines.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    Arc, ArcData, Parabola, ParabolaData, Pvi, Tangent, VerticalElement, VerticalGeometry,
};
use crate::error::{GeometryError, Result};
use crate::geometry::STATION_TOLERANCE;

/// Vertical curve anchored at the PVI with the same station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum VerticalCurveData {
    ParaCurve {
        station: f64,
        length: f64,
    },
    UnsymParaCurve {
        station: f64,
        length: f64,
        #[serde(rename = "lengthIn")]
        length_in: f64,
        #[serde(rename = "lengthOut")]
        length_out: f64,
    },
    CircCurve {
        station: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        radius: Option<f64>,
    },
}

impl VerticalCurveData {
    pub fn station(&self) -> f64 {
        match self {
            VerticalCurveData::ParaCurve { station, .. }
            | VerticalCurveData::UnsymParaCurve { station, .. }
            | VerticalCurveData::CircCurve { station, .. } => *station,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            VerticalCurveData::ParaCurve { .. } => "ParaCurve",
            VerticalCurveData::UnsymParaCurve { .. } => "UnsymParaCurve",
            VerticalCurveData::CircCurve { .. } => "CircCurve",
        }
    }

    /// Builds the curve at `pvi` between the given grades.
    pub fn build(&self, pvi: Pvi, grade_in: f64, grade_out: f64) -> Result<VerticalElement> {
        Ok(match *self {
            VerticalCurveData::ParaCurve { length, .. } => {
                VerticalElement::Parabola(Parabola::new(ParabolaData {
                    pvi,
                    length,
                    length_in: None,
                    length_out: None,
                    grade_in,
                    grade_out,
                    desc: None,
                })?)
            }
            VerticalCurveData::UnsymParaCurve {
                length,
                length_in,
                length_out,
                ..
            } => VerticalElement::Parabola(Parabola::new(ParabolaData {
                pvi,
                length,
                length_in: Some(length_in),
                length_out: Some(length_out),
                grade_in,
                grade_out,
                desc: None,
            })?),
            VerticalCurveData::CircCurve { length, radius, .. } => {
                VerticalElement::Arc(Arc::new(ArcData {
                    pvi,
                    length,
                    radius,
                    grade_in,
                    grade_out,
                    desc: None,
                })?)
            }
        })
    }
}

/// Why a curve definition was left out of the profile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("no PVI at this station")]
    NoMatchingPvi,
    #[error("another curve is already anchored at this PVI")]
    DuplicateCurve,
    #[error("curves cannot sit on the first or last PVI")]
    TerminalPvi,
    #[error("curve starts at {start} before the previous element ends at {previous_end}")]
    OverlapsPrevious { start: f64, previous_end: f64 },
    #[error("curve ends at {end} past the next PVI at {next_pvi}")]
    PastNextPvi { end: f64, next_pvi: f64 },
    #[error("curve could not be built: {0}")]
    Construction(GeometryError),
}

/// A curve definition that was skipped during assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyWarning {
    pub station: f64,
    pub curve_type: &'static str,
    pub reason: SkipReason,
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "skipped {} at station {}: {}",
            self.curve_type, self.station, self.reason
        )
    }
}

/// Result of [`assemble`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembly {
    pub elements: Vec<VerticalElement>,
    pub warnings: Vec<AssemblyWarning>,
}

struct Assembler<'a> {
    pvis: Vec<Pvi>,
    slots: Vec<Option<&'a VerticalCurveData>>,
    elements: Vec<VerticalElement>,
    warnings: Vec<AssemblyWarning>,
    /// End of the last emitted element.
    cursor: Pvi,
}

impl<'a> Assembler<'a> {
    fn warn(&mut self, curve: &VerticalCurveData, reason: SkipReason) {
        let warning = AssemblyWarning {
            station: curve.station(),
            curve_type: curve.kind(),
            reason,
        };
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    fn push_tangent_to(&mut self, station: f64, elevation: f64) -> Result<()> {
        if station > self.cursor.station + STATION_TOLERANCE {
            self.elements.push(VerticalElement::Tangent(Tangent::between(
                self.cursor.station,
                self.cursor.elevation,
                station,
                elevation,
            )?));
        }
        Ok(())
    }

    /// Builds and validates the curve at interior PVI `i`.
    fn place_curve(&mut self, i: usize, curve: &VerticalCurveData) -> Option<VerticalElement> {
        let pvi = self.pvis[i];
        let next = self.pvis[i + 1];
        let grade_in = self.pvis[i - 1].grade_to(&pvi);
        let grade_out = pvi.grade_to(&next);

        let element = match curve.build(pvi, grade_in, grade_out) {
            Ok(element) => element,
            Err(err) => {
                self.warn(curve, SkipReason::Construction(err));
                return None;
            }
        };
        let (start, end) = element.station_range();
        if start < self.cursor.station - STATION_TOLERANCE {
            let previous_end = self.cursor.station;
            self.warn(curve, SkipReason::OverlapsPrevious { start, previous_end });
            return None;
        }
        if end > next.station + STATION_TOLERANCE {
            self.warn(curve, SkipReason::PastNextPvi { end, next_pvi: next.station });
            return None;
        }
        Some(element)
    }

    fn run(mut self) -> Result<Assembly> {
        let last = self.pvis.len() - 1;
        for i in [0, last] {
            if let Some(curve) = self.slots[i].take() {
                self.warn(curve, SkipReason::TerminalPvi);
            }
        }

        for i in 1..=last {
            let slot = self.slots[i];
            match slot.and_then(|curve| self.place_curve(i, curve)) {
                Some(curve) => {
                    let (start, end) = curve.station_range();
                    let elev_bvc = curve.elevation_at_station(start)?;
                    self.push_tangent_to(start, elev_bvc)?;
                    self.cursor = Pvi::new(end, curve.elev_end());
                    self.elements.push(curve);
                }
                None => {
                    let pvi = self.pvis[i];
                    self.push_tangent_to(pvi.station, pvi.elevation)?;
                    self.cursor = pvi;
                }
            }
        }

        Ok(Assembly {
            elements: self.elements,
            warnings: self.warnings,
        })
    }
}

/// Assembles PVIs and curve definitions into contiguous vertical elements
/// covering the first to the last PVI station.
///
/// PVIs are sorted by station; at least two are required.
pub fn assemble(pvis: &[Pvi], curves: &[VerticalCurveData]) -> Result<Assembly> {
    if pvis.len() < 2 {
        return Err(GeometryError::InsufficientPoints {
            required: 2,
            actual: pvis.len(),
        });
    }
    let mut pvis = pvis.to_vec();
    pvis.sort_by(|a, b| a.station.total_cmp(&b.station));

    let mut assembler = Assembler {
        cursor: pvis[0],
        slots: vec![None; pvis.len()],
        pvis,
        elements: Vec::new(),
        warnings: Vec::new(),
    };
    for curve in curves {
        let index = assembler
            .pvis
            .iter()
            .position(|p| (p.station - curve.station()).abs() <= STATION_TOLERANCE);
        match index {
            None => assembler.warn(curve, SkipReason::NoMatchingPvi),
            Some(i) if assembler.slots[i].is_some() => {
                assembler.warn(curve, SkipReason::DuplicateCurve)
            }
            Some(i) => assembler.slots[i] = Some(curve),
        }
    }
    assembler.run()
}
