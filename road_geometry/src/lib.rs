//! Core library for road alignment geometry: horizontal elements,
//! vertical profiles and station-based queries.

pub mod alignment;
pub mod error;
pub mod geometry;
pub mod io;
pub mod profile;

pub use alignment::{Alignment, AlignmentData, HorizontalAlignment, HorizontalGeometry};
pub use error::{GeometryError, Result};
pub use profile::{Profile, Profiles, VerticalGeometry};
