//! Error types for alignment and profile geometry.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeometryError>;

/// Errors raised while building or querying geometry elements.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// A required input field was not supplied.
    #[error("{element}: missing required field '{field}'")]
    MissingField {
        /// Element type being built.
        element: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },

    /// An input field holds a value the element cannot use.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Name of the offending field or argument.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Length must not be negative.
    #[error("length must not be negative, got {0}")]
    NegativeLength(f64),

    /// Query position outside the span of an element or alignment.
    #[error("{value} is outside the valid range [{min}, {max}]")]
    OutOfRange {
        /// Requested station or distance.
        value: f64,
        /// Lower bound of the valid span.
        min: f64,
        /// Upper bound of the valid span.
        max: f64,
    },

    /// The geometry itself is ill-formed.
    #[error("degenerate geometry: {reason}")]
    Degenerate {
        /// Description of the degeneracy.
        reason: String,
    },

    /// Not enough points to define the object.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points.
        required: usize,
        /// Number of points supplied.
        actual: usize,
    },

    /// Station equations are inconsistent.
    #[error("invalid station equation: {reason}")]
    InvalidStationEquation {
        /// Description of the problem.
        reason: String,
    },

    /// An element of a larger structure failed to build.
    #[error("element {index} ({kind}): {source}")]
    Element {
        /// Position of the element in its input list.
        index: usize,
        /// Element type tag.
        kind: &'static str,
        /// Underlying error.
        source: Box<GeometryError>,
    },
}

impl GeometryError {
    /// Creates a missing field error.
    #[must_use]
    pub const fn missing(element: &'static str, field: &'static str) -> Self {
        Self::MissingField { element, field }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }

    /// Creates an out of range error.
    #[must_use]
    pub const fn out_of_range(value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange { value, min, max }
    }

    /// Creates a degenerate geometry error.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate {
            reason: reason.into(),
        }
    }

    /// Wraps an error with the index and type of the element that produced it.
    #[must_use]
    pub fn in_element(self, index: usize, kind: &'static str) -> Self {
        Self::Element {
            index,
            kind,
            source: Box::new(self),
        }
    }

    /// True for range errors, which only mean "not this element".
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        match self {
            Self::OutOfRange { .. } => true,
            Self::Element { source, .. } => source.is_out_of_range(),
            _ => false,
        }
    }

    /// True when the geometry itself is ill-formed.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        match self {
            Self::Degenerate { .. } => true,
            Self::Element { source, .. } => source.is_degenerate(),
            _ => false,
        }
    }
}

/// Rejects non-positive sampling steps.
pub(crate) fn check_step(step: f64) -> Result<()> {
    if step > 0.0 && step.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::invalid("step", format!("must be positive, got {step}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_values() {
        let err = GeometryError::out_of_range(12.5, 0.0, 10.0);
        assert!(err.to_string().contains("12.5"));
        assert!(err.to_string().contains("[0, 10]"));

        let err = GeometryError::missing("Spiral", "PI");
        assert_eq!(err.to_string(), "Spiral: missing required field 'PI'");
    }

    #[test]
    fn predicates_see_through_element_wrapper() {
        let err = GeometryError::degenerate("start equals PI").in_element(3, "Spiral");
        assert!(err.is_degenerate());
        assert!(!err.is_out_of_range());
        assert!(err.to_string().starts_with("element 3 (Spiral)"));

        let err = GeometryError::out_of_range(-1.0, 0.0, 5.0).in_element(0, "Line");
        assert!(err.is_out_of_range());
    }

    #[test]
    fn step_must_be_positive() {
        assert!(check_step(0.5).is_ok());
        assert!(check_step(0.0).is_err());
        assert!(check_step(-2.0).is_err());
        assert!(check_step(f64::NAN).is_err());
    }
}
