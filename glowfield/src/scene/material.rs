//! Surface coloring. This module is private but reexported by its parent.

use core::fmt;
use std::sync::Arc;

use crate::math::{Affine, FreePoint, Rgb};

/// Caller-supplied color function for [`Material::custom`].
///
/// The point received is in material-local coordinates.
pub type CustomColorFn = Arc<dyn Fn(FreePoint) -> Rgb + Send + Sync>;

/// A procedural surface color, sampled in its own local coordinate space.
///
/// A material carries a transform so that its pattern can be scaled, rotated, or offset
/// independently of the object it is applied to. Sampling applies the cached inverse of
/// that transform before evaluating the pattern.
#[derive(Clone)]
pub struct Material {
    kind: Kind,
    transform: Affine,
    inverse_transform: Affine,
}

#[derive(Clone)]
enum Kind {
    Solid(Rgb),
    Checker(Rgb, Rgb),
    Gradient(Rgb, Rgb),
    Custom(CustomColorFn),
}

impl Material {
    fn from_kind(kind: Kind) -> Self {
        Self {
            kind,
            transform: Affine::IDENTITY,
            inverse_transform: Affine::IDENTITY,
        }
    }

    /// A single color everywhere.
    pub fn solid(color: Rgb) -> Self {
        Self::from_kind(Kind::Solid(color))
    }

    /// A 3D checkerboard of unit cells alternating between the two colors.
    pub fn checker(color0: Rgb, color1: Rgb) -> Self {
        Self::from_kind(Kind::Checker(color0, color1))
    }

    /// Concentric rings blending from `color0` to `color1`, repeating every unit of
    /// distance from the material origin.
    pub fn gradient(color0: Rgb, color1: Rgb) -> Self {
        Self::from_kind(Kind::Gradient(color0, color1))
    }

    /// A caller-supplied pattern function, evaluated in material-local space.
    pub fn custom(function: impl Fn(FreePoint) -> Rgb + Send + Sync + 'static) -> Self {
        Self::from_kind(Kind::Custom(Arc::new(function)))
    }

    /// Sets the material's transform and refreshes the cached inverse.
    #[must_use]
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.set_transform(transform);
        self
    }

    /// Sets the material's transform and refreshes the cached inverse.
    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
        self.inverse_transform = transform.inverse();
    }

    /// The material's transform.
    pub fn transform(&self) -> &Affine {
        &self.transform
    }

    /// Samples the color at `point`, which is transformed into material-local space
    /// first.
    pub fn sample(&self, point: FreePoint) -> Rgb {
        let point = self.inverse_transform.transform_point(point);
        match &self.kind {
            Kind::Solid(color) => *color,
            Kind::Checker(color0, color1) => {
                let sum = point.x.floor() as i64 + point.y.floor() as i64 + point.z.floor() as i64;
                if sum & 1 == 0 { *color0 } else { *color1 }
            }
            Kind::Gradient(color0, color1) => {
                let m = point.to_vector().length();
                color0.lerp(*color1, m.fract())
            }
            Kind::Custom(function) => function(point),
        }
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            Kind::Solid(..) => "Solid",
            Kind::Checker(..) => "Checker",
            Kind::Gradient(..) => "Gradient",
            Kind::Custom(..) => "Custom",
        };
        f.debug_struct("Material")
            .field("kind", &name)
            .field("transform", &self.transform)
            .finish_non_exhaustive()
    }
}
