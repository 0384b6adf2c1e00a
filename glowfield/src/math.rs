//! Scalar, vector, transform, and color types used throughout the crate.

use euclid::{Point3D, Vector3D};

mod affine;
pub use affine::Affine;

mod color;
pub use color::Rgb;

// -------------------------------------------------------------------------------------------------

/// Unit-of-measure type for world-space coordinates.
///
/// Object-local and material-local coordinates share this unit; which space a value is in
/// is a matter of which [`Affine`] transforms have been applied, not of its type.
#[derive(Debug)]
pub enum World {}

/// Scalar type used for all spatial coordinates and distances.
pub type FreeCoordinate = f32;

/// A point in space.
pub type FreePoint = Point3D<FreeCoordinate, World>;

/// A direction or displacement in space.
pub type FreeVector = Vector3D<FreeCoordinate, World>;

// -------------------------------------------------------------------------------------------------

/// Linear interpolation between two scalars; `t = 0` yields `a` and `t = 1` yields `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Threshold under which a scalar is treated as zero (degenerate determinants,
/// reflectivity coefficients, color-blend short circuits).
pub(crate) const SMALL_NUMBER: f32 = 1e-5;

/// Stand-in distance for "no surface anywhere near"; larger than any reachable ray length.
pub(crate) const LARGE_NUMBER: f32 = 1e12;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.5), 4.0);
    }
}
