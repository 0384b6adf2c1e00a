//! Renderable objects: signed-distance primitives and their CSG combinations.
//! This module is private but reexported by its parent.

use core::fmt;

use euclid::vec3;

use crate::math::{Affine, FreePoint, FreeVector, Rgb, LARGE_NUMBER, SMALL_NUMBER, lerp};
use crate::scene::Material;

// -------------------------------------------------------------------------------------------------

/// Reflectance properties of an object's surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceInfo {
    /// Fraction of direct light the surface scatters diffusely; `0.0..=1.0`.
    pub albedo: f32,
    /// Fraction of reflected light tinted by the surface color; `0.0..=1.0`.
    pub metallic: f32,
    /// Fraction of reflected light passed through untinted; `0.0..=1.0`.
    pub dielectric: f32,
}

impl Default for SurfaceInfo {
    #[inline]
    fn default() -> Self {
        Self {
            albedo: 1.0,
            metallic: 0.0,
            dielectric: 0.0,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Caller-supplied distance function for [`Object::custom`].
///
/// The point received is in object-local coordinates.
pub type CustomDistanceFn = Box<dyn Fn(FreePoint) -> f32 + Send + Sync>;

/// The shape of an [`Object`]: either a distance-function primitive or a CSG
/// combination of child objects.
pub enum Primitive {
    /// Sphere of the given radius centered on the local origin.
    Sphere {
        /// Radius of the sphere.
        radius: f32,
    },
    /// Half-space boundary: all points `p` with `normal · p = height`.
    Plane {
        /// Surface normal; must be unit length.
        normal: FreeVector,
        /// Offset of the surface from the local origin, along the normal.
        height: f32,
    },
    /// Axis-aligned box centered on the local origin.
    Cube {
        /// Half the box's extent along each axis.
        half_extent: FreeVector,
    },
    /// A caller-supplied distance function.
    ///
    /// For sphere tracing to terminate on the true surface, the function must be
    /// 1-Lipschitz: it may underestimate the distance to the surface, but never
    /// overestimate it.
    Custom(CustomDistanceFn),
    /// A CSG combination of child objects.
    Composite(Composite),
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Sphere { radius } => f.debug_struct("Sphere").field("radius", radius).finish(),
            Primitive::Plane { normal, height } => f
                .debug_struct("Plane")
                .field("normal", normal)
                .field("height", height)
                .finish(),
            Primitive::Cube { half_extent } => f
                .debug_struct("Cube")
                .field("half_extent", half_extent)
                .finish(),
            Primitive::Custom(_) => f.write_str("Custom(..)"),
            Primitive::Composite(composite) => composite.fmt(f),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// How a [`Composite`] combines the distances (and colors) of its children.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CsgOperator {
    /// Points inside any child are inside the result (distance = min of children).
    Union,
    /// Points inside every child are inside the result (distance = max of children,
    /// seeded at zero: interior distances clamp to the surface).
    Intersection,
    /// The first child with every later child carved away.
    Difference,
    /// Union with creases rounded off; `k` is the blending radius (must be positive).
    SmoothUnion(f32),
    /// Morph between consecutive children: `k = 0.0` is the first child, `k = 1.0` the
    /// second, fractional values interpolate both distance and color. Negative `k` is
    /// treated as zero.
    Blend(f32),
}

/// An ordered set of child [`Object`]s combined by a [`CsgOperator`].
#[derive(Debug)]
pub struct Composite {
    operator: CsgOperator,
    children: Vec<Object>,
}

impl Composite {
    /// Combines `children` with `operator`.
    ///
    /// Panics if `children` is empty; every composite must have at least one child.
    #[track_caller]
    pub fn new(operator: CsgOperator, children: Vec<Object>) -> Self {
        assert!(
            !children.is_empty(),
            "a composite object must have at least one child"
        );
        Self { operator, children }
    }

    /// The combination rule.
    pub fn operator(&self) -> CsgOperator {
        self.operator
    }

    /// The child objects.
    pub fn children(&self) -> &[Object] {
        &self.children
    }

    /// Signed distance from `point` (in the composite's local space) to the combined
    /// surface.
    pub fn distance(&self, point: FreePoint) -> f32 {
        match self.operator {
            CsgOperator::Union => self
                .children
                .iter()
                .fold(LARGE_NUMBER, |d, child| d.min(child.transformed_distance(point))),
            // Seeding the fold at zero clamps interior (all-negative) distances to the
            // surface; exterior queries, which are all the tracer makes, are unaffected.
            CsgOperator::Intersection => self
                .children
                .iter()
                .fold(0.0, |d, child| d.max(child.transformed_distance(point))),
            CsgOperator::Difference => {
                let mut children = self.children.iter();
                let first = children
                    .next()
                    .map_or(LARGE_NUMBER, |child| child.transformed_distance(point));
                children.fold(first, |d, child| d.max(-child.transformed_distance(point)))
            }
            CsgOperator::SmoothUnion(k) => {
                let mut children = self.children.iter();
                let first = children
                    .next()
                    .map_or(LARGE_NUMBER, |child| child.transformed_distance(point));
                children.fold(first, |d, child| {
                    smooth_union(d, child.transformed_distance(point), k)
                })
            }
            CsgOperator::Blend(k) => {
                let (lower, upper, t) = self.blend_indices(k);
                let distance_of = |index: Option<usize>| {
                    index
                        .and_then(|i| self.children.get(i))
                        .map_or(LARGE_NUMBER, |child| child.transformed_distance(point))
                };
                lerp(distance_of(lower), distance_of(upper), t)
            }
        }
    }

    /// Color at `point` (in the composite's local space): a distance-weighted blend of
    /// the children's colors, except for [`CsgOperator::Blend`], which interpolates the
    /// same pair of children as its distance does.
    pub fn color_at(&self, point: FreePoint) -> Rgb {
        if let CsgOperator::Blend(k) = self.operator {
            let (lower, upper, t) = self.blend_indices(k);
            let color_of = |index: Option<usize>| {
                index
                    .and_then(|i| self.children.get(i))
                    .map_or(Rgb::BLACK, |child| child.color_at(point))
            };
            return color_of(lower).lerp(color_of(upper), t);
        }

        let mut color = Rgb::BLACK;
        let mut weight = 0.0;
        for child in &self.children {
            let child_distance = child.transformed_distance(point).abs();
            let child_color = child.color_at(point);
            if child_distance < SMALL_NUMBER * 10.0 {
                // The point is on (or numerically at) this child's surface.
                return child_color;
            }
            let child_weight = child_distance.powf(0.9).recip();
            weight += child_weight;
            color += child_color * child_weight;
        }
        color / weight
    }

    /// The pair of child indices a [`CsgOperator::Blend`] of factor `k` interpolates
    /// between, and the interpolation parameter. `None` marks an out-of-range index.
    fn blend_indices(&self, k: f32) -> (Option<usize>, Option<usize>, f32) {
        let k = k.max(0.0);
        let lower = k.floor() as usize;
        let in_range = |index: usize| (index < self.children.len()).then_some(index);
        (in_range(lower), in_range(lower + 1), k.fract())
    }
}

/// Polynomial smooth minimum of two distances with blending radius `k`.
fn smooth_union(d1: f32, d2: f32, k: f32) -> f32 {
    let h = (k - (d1 - d2).abs()).max(0.0) / k;
    d1.min(d2) - h * h * h * k * (1.0 / 6.0)
}

// -------------------------------------------------------------------------------------------------

/// A renderable object: a [`Primitive`] with a placement transform, an optional
/// [`Material`], and [`SurfaceInfo`].
///
/// The inverse of the transform is cached and refreshed whenever the transform is
/// assigned, so distance and color queries pay no inversion cost.
#[derive(Debug)]
pub struct Object {
    primitive: Primitive,
    transform: Affine,
    inverse_transform: Affine,
    material: Option<Material>,
    surface: SurfaceInfo,
}

impl Object {
    fn from_primitive(primitive: Primitive) -> Self {
        Self {
            primitive,
            transform: Affine::IDENTITY,
            inverse_transform: Affine::IDENTITY,
            material: None,
            surface: SurfaceInfo::default(),
        }
    }

    /// A sphere of the given radius centered on the local origin.
    pub fn sphere(radius: f32) -> Self {
        Self::from_primitive(Primitive::Sphere { radius })
    }

    /// A plane through the local origin with the given unit normal.
    pub fn plane(normal: FreeVector) -> Self {
        Self::plane_at(normal, 0.0)
    }

    /// A plane with the given unit normal, offset `height` along it.
    pub fn plane_at(normal: FreeVector, height: f32) -> Self {
        Self::from_primitive(Primitive::Plane { normal, height })
    }

    /// An axis-aligned cube with the given edge length, centered on the local origin.
    pub fn cube(size: f32) -> Self {
        Self::cuboid(vec3(size, size, size))
    }

    /// An axis-aligned box with the given edge lengths, centered on the local origin.
    pub fn cuboid(size: FreeVector) -> Self {
        Self::from_primitive(Primitive::Cube {
            half_extent: size * 0.5,
        })
    }

    /// An object defined by a caller-supplied distance function; see
    /// [`Primitive::Custom`] for the requirements on the function.
    pub fn custom(function: impl Fn(FreePoint) -> f32 + Send + Sync + 'static) -> Self {
        Self::from_primitive(Primitive::Custom(Box::new(function)))
    }

    /// The union of `children`. Panics if `children` is empty.
    #[track_caller]
    pub fn union(children: Vec<Object>) -> Self {
        Self::composite(CsgOperator::Union, children)
    }

    /// The intersection of `children`. Panics if `children` is empty.
    #[track_caller]
    pub fn intersection(children: Vec<Object>) -> Self {
        Self::composite(CsgOperator::Intersection, children)
    }

    /// The first child minus all the rest. Panics if `children` is empty.
    #[track_caller]
    pub fn difference(children: Vec<Object>) -> Self {
        Self::composite(CsgOperator::Difference, children)
    }

    /// The union of `children` with creases rounded over radius `k`.
    /// Panics if `children` is empty.
    #[track_caller]
    pub fn smooth_union(children: Vec<Object>, k: f32) -> Self {
        Self::composite(CsgOperator::SmoothUnion(k), children)
    }

    /// A morph between consecutive `children` selected by factor `k`; see
    /// [`CsgOperator::Blend`]. Panics if `children` is empty.
    #[track_caller]
    pub fn blend(children: Vec<Object>, k: f32) -> Self {
        Self::composite(CsgOperator::Blend(k), children)
    }

    /// A composite of `children` under `operator`. Panics if `children` is empty.
    #[track_caller]
    pub fn composite(operator: CsgOperator, children: Vec<Object>) -> Self {
        Self::from_primitive(Primitive::Composite(Composite::new(operator, children)))
    }

    /// Sets the object's transform and refreshes the cached inverse.
    #[must_use]
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.set_transform(transform);
        self
    }

    /// Sets the object's transform and refreshes the cached inverse.
    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
        self.inverse_transform = transform.inverse();
    }

    /// Assigns a material.
    ///
    /// On a composite, the material is assigned to every child instead (recursively);
    /// the composite's own binding is never consulted by color lookup.
    #[must_use]
    pub fn with_material(mut self, material: Material) -> Self {
        self.set_material(material);
        self
    }

    /// Assigns a solid-color material.
    #[must_use]
    pub fn with_color(self, color: Rgb) -> Self {
        self.with_material(Material::solid(color))
    }

    /// Sets the surface reflectance properties.
    #[must_use]
    pub fn with_surface(mut self, surface: SurfaceInfo) -> Self {
        self.surface = surface;
        self
    }

    /// See [`Object::with_material`].
    pub fn set_material(&mut self, material: Material) {
        if let Primitive::Composite(composite) = &mut self.primitive {
            for child in &mut composite.children {
                child.set_material(material.clone());
            }
        } else {
            self.material = Some(material);
        }
    }

    /// The object's shape.
    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    /// The object's transform.
    pub fn transform(&self) -> &Affine {
        &self.transform
    }

    /// The cached inverse of the object's transform.
    pub fn inverse_transform(&self) -> &Affine {
        &self.inverse_transform
    }

    /// The surface reflectance properties.
    pub fn surface_info(&self) -> SurfaceInfo {
        self.surface
    }

    /// Signed distance from `point` (in object-local space) to the surface:
    /// negative inside, positive outside, zero on the surface.
    pub fn distance(&self, point: FreePoint) -> f32 {
        match &self.primitive {
            Primitive::Sphere { radius } => point.to_vector().length() - radius,
            Primitive::Plane { normal, height } => normal.dot(point.to_vector()) - height,
            Primitive::Cube { half_extent } => {
                let d = point.to_vector().abs() - *half_extent;
                let outside = d.max(vec3(0.0, 0.0, 0.0)).length();
                let inside = d.x.max(d.y).max(d.z).min(0.0);
                outside + inside
            }
            Primitive::Custom(function) => function(point),
            Primitive::Composite(composite) => composite.distance(point),
        }
    }

    /// Signed distance from `point` in the space the object is placed in, applying the
    /// cached inverse transform first.
    #[inline]
    pub fn transformed_distance(&self, point: FreePoint) -> f32 {
        self.distance(self.inverse_transform.transform_point(point))
    }

    /// The surface color at `point`, which is in the space the object is placed in.
    ///
    /// An object with no material is white. Composites blend their children's colors;
    /// see [`Composite::color_at`].
    pub fn color_at(&self, point: FreePoint) -> Rgb {
        let local = self.inverse_transform.transform_point(point);
        if let Primitive::Composite(composite) = &self.primitive {
            composite.color_at(local)
        } else {
            match &self.material {
                Some(material) => material.sample(local),
                None => Rgb::WHITE,
            }
        }
    }
}
