//! 3×4 affine transformation matrices.
//! This module is private but reexported by its parent.

use core::ops;

use euclid::vec3;

use crate::math::{FreePoint, FreeVector, SMALL_NUMBER};

/// A 3×4 affine transformation matrix: a 3×3 linear block plus a translation column.
///
/// The bottom row is an implicit `[0, 0, 0, 1]`, so the matrix can represent rotation,
/// scale, skew, and translation, but not projection.
//---
// Design note: `euclid` has `Transform3D`, but we want the exact semantics of the
// renderer — cheap 3×4 storage, basis-column access, and a determinant-guarded inverse
// that falls back to identity rather than failing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    /// First column (the X basis vector).
    pub x: FreeVector,
    /// Second column (the Y basis vector).
    pub y: FreeVector,
    /// Third column (the Z basis vector).
    pub z: FreeVector,
    /// Fourth column (the translation).
    pub w: FreeVector,
}

impl Affine {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        x: vec3(1.0, 0.0, 0.0),
        y: vec3(0.0, 1.0, 0.0),
        z: vec3(0.0, 0.0, 1.0),
        w: vec3(0.0, 0.0, 0.0),
    };

    /// Construct a transform from its basis vectors and translation.
    #[inline]
    pub const fn from_basis(
        x: FreeVector,
        y: FreeVector,
        z: FreeVector,
        translation: FreeVector,
    ) -> Self {
        Self {
            x,
            y,
            z,
            w: translation,
        }
    }

    /// Construct a translation transform.
    ///
    /// ```
    /// use euclid::{point3, vec3};
    /// use glowfield::math::Affine;
    ///
    /// let t = Affine::from_translation(vec3(1.0, 2.0, 3.0));
    /// assert_eq!(t.transform_point(point3(1.0, 0.0, 0.0)), point3(2.0, 2.0, 3.0));
    /// ```
    #[inline]
    pub fn from_translation(offset: FreeVector) -> Self {
        Self {
            w: offset,
            ..Self::IDENTITY
        }
    }

    /// Construct a per-axis scaling transform.
    #[inline]
    pub fn from_scale(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: vec3(x, 0.0, 0.0),
            y: vec3(0.0, y, 0.0),
            z: vec3(0.0, 0.0, z),
            w: vec3(0.0, 0.0, 0.0),
        }
    }

    /// Construct a uniform scaling transform.
    #[inline]
    pub fn from_uniform_scale(scale: f32) -> Self {
        Self::from_scale(scale, scale, scale)
    }

    /// Rotation about the X axis, in radians.
    #[inline]
    pub fn rotation_x(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            x: vec3(1.0, 0.0, 0.0),
            y: vec3(0.0, c, s),
            z: vec3(0.0, -s, c),
            w: vec3(0.0, 0.0, 0.0),
        }
    }

    /// Rotation about the Y axis, in radians.
    #[inline]
    pub fn rotation_y(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            x: vec3(c, 0.0, -s),
            y: vec3(0.0, 1.0, 0.0),
            z: vec3(s, 0.0, c),
            w: vec3(0.0, 0.0, 0.0),
        }
    }

    /// Rotation about the Z axis, in radians.
    #[inline]
    pub fn rotation_z(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            x: vec3(c, s, 0.0),
            y: vec3(-s, c, 0.0),
            z: vec3(0.0, 0.0, 1.0),
            w: vec3(0.0, 0.0, 0.0),
        }
    }

    /// Apply the transform to a point (rotation/scale and translation).
    #[inline]
    pub fn transform_point(&self, point: FreePoint) -> FreePoint {
        (self.x * point.x + self.y * point.y + self.z * point.z + self.w).to_point()
    }

    /// Apply only the linear part of the transform to a direction vector
    /// (no translation).
    #[inline]
    pub fn transform_vector(&self, vector: FreeVector) -> FreeVector {
        self.x * vector.x + self.y * vector.y + self.z * vector.z
    }

    /// The translation column.
    #[inline]
    pub fn translation(&self) -> FreeVector {
        self.w
    }

    /// Determinant of the linear 3×3 block.
    #[inline]
    pub fn determinant(&self) -> f32 {
        self.x.dot(self.y.cross(self.z))
    }

    /// The inverse transform.
    ///
    /// A degenerate matrix (determinant magnitude below 1e-5) has no usable inverse;
    /// identity is returned instead so that rendering degrades rather than crashing.
    ///
    /// ```
    /// use euclid::vec3;
    /// use glowfield::math::Affine;
    ///
    /// let t = Affine::from_translation(vec3(0.0, 4.0, 0.0)) * Affine::rotation_y(1.0);
    /// let round_trip = t * t.inverse();
    /// assert!(round_trip.distance_from(&Affine::IDENTITY) < 1e-5);
    ///
    /// assert_eq!(Affine::from_uniform_scale(0.0).inverse(), Affine::IDENTITY);
    /// ```
    pub fn inverse(&self) -> Self {
        let determinant = self.determinant();
        if determinant.abs() < SMALL_NUMBER {
            return Self::IDENTITY;
        }
        let inverse_det = 1.0 / determinant;

        // Rows of the inverted linear block.
        let r0 = self.y.cross(self.z) * inverse_det;
        let r1 = self.z.cross(self.x) * inverse_det;
        let r2 = self.x.cross(self.y) * inverse_det;

        Self {
            x: vec3(r0.x, r1.x, r2.x),
            y: vec3(r0.y, r1.y, r2.y),
            z: vec3(r0.z, r1.z, r2.z),
            w: vec3(-r0.dot(self.w), -r1.dot(self.w), -r2.dot(self.w)),
        }
    }

    /// Sum of squared differences of all elements; a Frobenius-style distance for
    /// comparing transforms in tests and assertions.
    #[inline]
    pub fn distance_from(&self, other: &Self) -> f32 {
        (self.x - other.x).square_length()
            + (self.y - other.y).square_length()
            + (self.z - other.z).square_length()
            + (self.w - other.w).square_length()
    }
}

impl Default for Affine {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Composition: `(a * b).transform_point(p) == a.transform_point(b.transform_point(p))`.
impl ops::Mul for Affine {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            x: self.transform_vector(rhs.x),
            y: self.transform_vector(rhs.y),
            z: self.transform_vector(rhs.z),
            w: self.transform_vector(rhs.w) + self.w,
        }
    }
}
