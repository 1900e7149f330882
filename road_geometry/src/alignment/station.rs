//! Station equations: breaks between displayed and internal stationing.
//!
//! Internal stations are continuous distances along the geometry. Displayed
//! stations jump from `staBack` to `staAhead` at each equation.

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};

/// LandXML `<StaEquation>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationEquationData {
    pub sta_ahead: f64,
    pub sta_back: f64,
    /// Defaults to `sta_back`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sta_internal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationEquation {
    pub sta_back: f64,
    pub sta_ahead: f64,
    pub sta_internal: f64,
    pub desc: Option<String>,
}

impl StationEquation {
    /// Displayed station change across the equation.
    pub fn adjustment(&self) -> f64 {
        self.sta_ahead - self.sta_back
    }
}

impl From<StationEquationData> for StationEquation {
    fn from(data: StationEquationData) -> Self {
        Self {
            sta_back: data.sta_back,
            sta_ahead: data.sta_ahead,
            sta_internal: data.sta_internal.unwrap_or(data.sta_back),
            desc: data.desc,
        }
    }
}

/// Station equations sorted by strictly ascending internal station.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationEquations {
    equations: Vec<StationEquation>,
}

impl StationEquations {
    pub fn new(data: Vec<StationEquationData>) -> Result<Self> {
        let mut equations: Vec<StationEquation> = data.into_iter().map(Into::into).collect();
        equations.sort_by(|a, b| a.sta_internal.total_cmp(&b.sta_internal));
        for pair in equations.windows(2) {
            if pair[0].sta_internal >= pair[1].sta_internal {
                return Err(GeometryError::InvalidStationEquation {
                    reason: format!(
                        "internal stations must be strictly ascending: {} >= {}",
                        pair[0].sta_internal, pair[1].sta_internal
                    ),
                });
            }
        }
        Ok(Self { equations })
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationEquation> {
        self.equations.iter()
    }

    /// Displayed station to internal station. Stations inside the gap of an
    /// equation map onto its internal station.
    pub fn station_to_internal(&self, station: f64) -> f64 {
        let mut internal = station;
        for eq in &self.equations {
            if station < eq.sta_back {
                break;
            } else if station >= eq.sta_ahead {
                internal = eq.sta_internal + (station - eq.sta_ahead);
            } else {
                internal = eq.sta_internal;
                break;
            }
        }
        internal
    }

    /// Internal station to displayed station.
    pub fn internal_to_station(&self, internal: f64) -> f64 {
        self.equations
            .iter()
            .take_while(|eq| internal >= eq.sta_internal)
            .last()
            .map_or(internal, |eq| eq.sta_ahead + (internal - eq.sta_internal))
    }

    pub fn to_data(&self) -> Vec<StationEquationData> {
        self.equations
            .iter()
            .map(|eq| StationEquationData {
                sta_ahead: eq.sta_ahead,
                sta_back: eq.sta_back,
                sta_internal: Some(eq.sta_internal),
                desc: eq.desc.clone(),
            })
            .collect()
    }
}
