//! Basic 2D/3D point and vector types used throughout the crate.

/// Representation of a 2D point.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `self` to `other`.
    pub fn to(self, other: Point) -> Vector {
        Vector::new(other.x - self.x, other.y - self.y)
    }

    /// Point reached by moving `dist` along `dir` from `self`.
    pub fn offset(self, dir: Vector, dist: f64) -> Point {
        Point::new(self.x + dir.x * dist, self.y + dir.y * dist)
    }

    /// Transforms a point given in a local frame (origin `self`, x-axis at
    /// `angle`) into the global frame.
    pub fn from_local(self, angle: f64, local_x: f64, local_y: f64) -> Point {
        let (sin_a, cos_a) = angle.sin_cos();
        Point::new(
            self.x + local_x * cos_a - local_y * sin_a,
            self.y + local_x * sin_a + local_y * cos_a,
        )
    }

    /// Inverse of [`Point::from_local`].
    pub fn into_local(self, angle: f64, global: Point) -> (f64, f64) {
        let (sin_a, cos_a) = angle.sin_cos();
        let dx = global.x - self.x;
        let dy = global.y - self.y;
        (dx * cos_a + dy * sin_a, -dx * sin_a + dy * cos_a)
    }
}

/// Representation of a 3D point.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Calculates the Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// 2D direction or displacement.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector at a math angle (radians, counter-clockwise from +X).
    pub fn from_angle(angle: f64) -> Self {
        let (sin_a, cos_a) = angle.sin_cos();
        Self::new(cos_a, sin_a)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Math angle of the vector.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn dot(self, other: Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product; positive when `other` lies to the left.
    pub fn cross(self, other: Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Unit vector in the same direction, or `None` when shorter than `min_length`.
    pub fn normalized(self, min_length: f64) -> Option<Self> {
        let len = self.length();
        if len < min_length {
            None
        } else {
            Some(self.scale(1.0 / len))
        }
    }

    /// Rotates counter-clockwise by `angle` radians.
    pub fn rotate(self, angle: f64) -> Self {
        let (sin_a, cos_a) = angle.sin_cos();
        Self::new(self.x * cos_a - self.y * sin_a, self.x * sin_a + self.y * cos_a)
    }

    /// Rotated +90°.
    pub fn perp_left(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Rotated -90°.
    pub fn perp_right(self) -> Self {
        Self::new(self.y, -self.x)
    }
}

impl std::ops::Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}
