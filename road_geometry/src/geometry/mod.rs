//! Scalar geometry primitives shared by the alignment and profile modules.

mod angle;
mod integrals;
mod point;

pub use angle::{
    angle_to_azimuth, azimuth_to_angle, normalize_angle, normalize_angle_positive, Rotation,
    Side,
};
pub use integrals::fresnel_integrals;
pub use point::{distance, Point, Point3, Vector};

/// Tolerance used when comparing stations.
pub const STATION_TOLERANCE: f64 = 1e-6;
