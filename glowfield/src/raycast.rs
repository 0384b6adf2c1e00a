//! Rays and the results of marching them.

use crate::math::{FreeCoordinate, FreePoint, FreeVector};

// -------------------------------------------------------------------------------------------------

/// A ray: a half-infinite line whose points are identified by the distance `t` along it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// The start of the ray.
    pub origin: FreePoint,
    /// The direction in which it extends. Unit length is expected by the tracer;
    /// the camera and shading code construct rays accordingly.
    pub direction: FreeVector,
}

impl Ray {
    /// Constructs a [`Ray`] from the given origin and direction.
    #[inline]
    pub const fn new(origin: FreePoint, direction: FreeVector) -> Self {
        Self { origin, direction }
    }

    /// The point at distance `t` along the ray.
    #[inline]
    pub fn point_along(&self, t: FreeCoordinate) -> FreePoint {
        self.origin + self.direction * t
    }
}

// -------------------------------------------------------------------------------------------------

/// Result of sphere-tracing a [`Ray`] against a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarchOutcome {
    /// The ray reached a surface.
    Hit {
        /// The point at which the surface threshold was crossed.
        point: FreePoint,
        /// The ray length at that point.
        t: FreeCoordinate,
    },
    /// The ray exceeded its length budget without reaching a surface.
    Miss {
        /// The smallest scene distance seen anywhere along the ray; small values mean
        /// the ray grazed an object. Used for the outline visualization.
        min_distance: FreeCoordinate,
    },
}

impl MarchOutcome {
    /// Whether this outcome is a surface hit.
    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, MarchOutcome::Hit { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::{point3, vec3};
    use pretty_assertions::assert_eq;

    #[test]
    fn point_along_scales_direction() {
        let ray = Ray::new(point3(1.0, 0.0, 0.0), vec3(0.0, 2.0, 0.0));
        assert_eq!(ray.point_along(0.0), point3(1.0, 0.0, 0.0));
        assert_eq!(ray.point_along(1.5), point3(1.0, 3.0, 0.0));
    }
}
