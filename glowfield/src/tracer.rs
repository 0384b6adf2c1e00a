//! Sphere tracing and shading: how a [`Scene`] turns rays into colors.
//!
//! Sphere tracing steps a ray forward by the scene's signed distance at each point; as
//! long as every distance function is 1-Lipschitz, each step is the largest that cannot
//! overshoot a surface.

use crate::math::{FreePoint, FreeVector, LARGE_NUMBER, Rgb, SMALL_NUMBER};
use crate::raycast::{MarchOutcome, Ray};
use crate::scene::{Object, Scene};

// -------------------------------------------------------------------------------------------------

/// Surface threshold: a ray is considered to have hit when the scene distance falls
/// below this, and marching starts this far along the ray.
pub const MIN_STEP: f32 = 1e-4;

/// How far a ray may travel before it is considered to have missed everything.
/// Smaller values render faster but cut off distant geometry.
pub const MAX_LENGTH: f32 = 60.0;

/// How far off a surface shadow and reflection rays start, to avoid immediately
/// re-hitting the surface they leave.
pub const SECONDARY_RAY_OFFSET: f32 = MIN_STEP * 10.0;

/// Bound on marching iterations for a single ray, against distance fields that
/// converge too slowly (or not at all).
pub const STEP_LIMIT: u32 = 200;

/// Bound on recursive reflection bounces for a primary ray.
pub const MAX_REFLECTION_DEPTH: u32 = 4;

/// Penumbra sharpness for point-light soft shadows; larger is sharper.
pub const SHADOW_PENUMBRA_K: f32 = 24.0;

/// The color of rays that miss every object.
pub const BACKGROUND_COLOR: Rgb = Rgb::new(0.2, 0.3, 0.4);

/// Draw a bright outline where rays graze objects without hitting them.
const DRAW_OBJECT_OUTLINE: bool = false;

// -------------------------------------------------------------------------------------------------

impl Scene {
    /// The color of pixel `(x, y)`: projects the camera ray and evaluates it at full
    /// reflection depth.
    pub fn color_at_pixel(&self, x: u32, y: u32) -> Rgb {
        self.color_for_ray(self.camera().ray_for_pixel(x, y), MAX_REFLECTION_DEPTH)
    }

    /// Evaluates a ray to a color, following up to `depth` reflection bounces.
    ///
    /// `depth` of zero yields black (the recursion budget is spent); rays that hit
    /// nothing yield [`BACKGROUND_COLOR`].
    pub fn color_for_ray(&self, ray: Ray, depth: u32) -> Rgb {
        if depth == 0 {
            return Rgb::BLACK;
        }

        match self.march(ray, MAX_LENGTH) {
            MarchOutcome::Hit { point, .. } => match self.closest_object(point) {
                Some(object) => self.shade(object, ray.direction, point, depth),
                None => BACKGROUND_COLOR,
            },
            MarchOutcome::Miss { min_distance } => {
                if DRAW_OBJECT_OUTLINE && min_distance < 0.05 {
                    return Rgb::WHITE.lerp(BACKGROUND_COLOR, min_distance * 20.0);
                }
                BACKGROUND_COLOR
            }
        }
    }

    /// Sphere-traces `ray` until a surface is within [`MIN_STEP`], the step budget runs
    /// out, or the ray length exceeds `max_length`.
    pub fn march(&self, ray: Ray, max_length: f32) -> MarchOutcome {
        let mut t = MIN_STEP;
        let mut steps = 0;
        let mut min_distance = LARGE_NUMBER;

        while t < max_length {
            let point = ray.point_along(t);
            let distance = self.min_distance(point);
            min_distance = min_distance.min(distance);

            if distance.abs() < MIN_STEP || steps > STEP_LIMIT {
                return MarchOutcome::Hit { point, t };
            }

            t += distance;
            steps += 1;
        }
        MarchOutcome::Miss { min_distance }
    }

    /// Marches a shadow ray toward a light, returning the fraction of light that gets
    /// through: 0 is fully occluded, 1 is unobstructed.
    ///
    /// Partial values arise when the ray passes close to a surface; `penumbra_k`
    /// controls how sharply the shadow edge falls off.
    /// See <https://iquilezles.org/articles/rmshadows/>.
    pub fn shadow_march(&self, ray: Ray, max_length: f32, penumbra_k: f32) -> f32 {
        let mut shadow = 1.0f32;
        let mut t = 0.0;

        while t < max_length {
            let distance = self.min_distance(ray.point_along(t));
            if distance < MIN_STEP {
                return 0.0;
            }
            shadow = shadow.min(penumbra_k * distance / t);
            t += distance;
        }
        shadow
    }

    /// Estimates the surface normal at `point` from the central difference of the
    /// scene's distance field along each axis.
    pub fn normal_at(&self, point: FreePoint) -> FreeVector {
        let e = SECONDARY_RAY_OFFSET;
        let dx = self.min_distance(point + FreeVector::new(e, 0.0, 0.0))
            - self.min_distance(point - FreeVector::new(e, 0.0, 0.0));
        let dy = self.min_distance(point + FreeVector::new(0.0, e, 0.0))
            - self.min_distance(point - FreeVector::new(0.0, e, 0.0));
        let dz = self.min_distance(point + FreeVector::new(0.0, 0.0, e))
            - self.min_distance(point - FreeVector::new(0.0, 0.0, e));
        FreeVector::new(dx, dy, dz).normalize()
    }

    /// Shades a surface point on `object`: one reflection bounce (if the surface is
    /// metallic or dielectric) plus the shadowed contribution of every light.
    ///
    /// `view_direction` is the direction of the ray that arrived here, assumed unit
    /// length. The result is unclamped; clamping happens at presentation.
    fn shade(&self, object: &Object, view_direction: FreeVector, point: FreePoint, depth: u32) -> Rgb {
        let mut color = Rgb::BLACK;

        let normal = self.normal_at(point);
        let surface_color = object.color_at(point);
        let surface = object.surface_info();

        // Secondary rays start slightly off the surface so they don't re-hit it at t≈0.
        let start = point + normal * SECONDARY_RAY_OFFSET;

        if surface.dielectric.abs() > SMALL_NUMBER || surface.metallic.abs() > SMALL_NUMBER {
            let reflection = view_direction - normal * (2.0 * view_direction.dot(normal));
            let reflected = self.color_for_ray(Ray::new(start, reflection), depth - 1);
            color += reflected * surface_color * surface.metallic;
            color += reflected * surface.dielectric;
        }

        for light in self.lights() {
            if let Some(source) = light.shadow_source() {
                let to_light = source - point;
                let distance = to_light.length();
                let shadow =
                    self.shadow_march(Ray::new(start, to_light / distance), distance, SHADOW_PENUMBRA_K);
                if shadow > 0.0 {
                    color += light.contribution(point, normal)
                        * surface_color
                        * (shadow * surface.albedo);
                }
            } else {
                color += light.contribution(point, normal) * surface_color * surface.albedo;
            }
        }
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::math::Affine;
    use crate::scene::{Light, Object, SurfaceInfo};
    use approx::assert_relative_eq;
    use euclid::{point3, vec3};
    use pretty_assertions::assert_eq;

    fn assert_color_eq(actual: Rgb, expected: Rgb, epsilon: f32) {
        assert_relative_eq!(actual.red(), expected.red(), epsilon = epsilon);
        assert_relative_eq!(actual.green(), expected.green(), epsilon = epsilon);
        assert_relative_eq!(actual.blue(), expected.blue(), epsilon = epsilon);
    }

    /// A sphere in front of the camera under flat ambient light: the center pixel shows
    /// the ambient color, the corners the background.
    #[test]
    fn ambient_lit_sphere_and_background() {
        let mut scene = Scene::new();
        scene.set_camera(Camera::new(point3(0.0, 0.0, -5.0), point3(0.0, 0.0, 0.0)));
        scene.push_object(Object::sphere(1.0));
        scene.push_light(Light::ambient(Rgb::new(0.5, 0.5, 0.5)));
        scene.set_scene_size(100, 100);

        assert_color_eq(scene.color_at_pixel(50, 50), Rgb::new(0.5, 0.5, 0.5), 1e-3);
        for (x, y) in [(0, 0), (99, 0), (0, 99), (99, 99)] {
            assert_eq!(scene.color_at_pixel(x, y), BACKGROUND_COLOR);
        }
    }

    /// A point light over a ground plane: the lit color is the light scaled by the
    /// cosine of the incidence angle.
    #[test]
    fn point_lit_plane_follows_incidence() {
        let mut scene = Scene::new();
        scene.set_camera(Camera::new(point3(0.0, 3.0, -4.0), point3(0.0, 0.0, 0.0)));
        scene.push_object(Object::plane(vec3(0.0, 1.0, 0.0)));
        scene.push_light(Light::point(point3(0.0, 5.0, 0.0), Rgb::WHITE));
        scene.set_scene_size(64, 64);

        let ray = scene.camera().ray_for_pixel(32, 32);
        let MarchOutcome::Hit { point, .. } = scene.march(ray, MAX_LENGTH) else {
            panic!("expected the ray to hit the plane");
        };
        assert_relative_eq!(point.y, 0.0, epsilon = 1e-3);

        let to_light = (point3(0.0, 5.0, 0.0) - point).normalize();
        let expected = to_light.y; // n = +Y
        let shaded = scene.color_at_pixel(32, 32);
        assert_relative_eq!(shaded.red(), expected, epsilon = 1e-2);
        assert_relative_eq!(shaded.green(), expected, epsilon = 1e-2);
    }

    #[test]
    fn miss_yields_background() {
        let mut scene = Scene::new();
        scene.set_camera(Camera::new(point3(0.0, 0.0, -5.0), point3(0.0, 0.0, 0.0)));
        scene.set_scene_size(16, 16);
        assert_eq!(scene.color_at_pixel(8, 8), BACKGROUND_COLOR);
    }

    #[test]
    fn depth_zero_is_black() {
        let mut scene = Scene::new();
        scene.push_object(Object::sphere(1.0));
        scene.push_light(Light::ambient(Rgb::WHITE));
        scene.set_scene_size(16, 16);
        let ray = Ray::new(point3(0.0, 0.0, -5.0), vec3(0.0, 0.0, 1.0));
        assert_eq!(scene.color_for_ray(ray, 0), Rgb::BLACK);
    }

    #[test]
    fn march_reports_closest_approach_on_miss() {
        let mut scene = Scene::new();
        scene.push_object(Object::sphere(1.0));
        // A ray passing 2 units over the sphere.
        let ray = Ray::new(point3(-30.0, 3.0, 0.0), vec3(1.0, 0.0, 0.0));
        let MarchOutcome::Miss { min_distance } = scene.march(ray, MAX_LENGTH) else {
            panic!("expected a miss");
        };
        // Sphere tracing samples sparsely, so the reported closest approach is only an
        // upper bound on the true clearance.
        assert!(
            (2.0..2.5).contains(&min_distance),
            "min_distance = {min_distance}"
        );
    }

    #[test]
    fn unobstructed_shadow_ray_is_fully_lit() {
        let mut scene = Scene::new();
        scene.push_object(
            Object::sphere(1.0)
                .with_transform(Affine::from_translation(vec3(0.0, -50.0, 0.0))),
        );
        let ray = Ray::new(point3(0.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0));
        assert_eq!(scene.shadow_march(ray, 10.0, SHADOW_PENUMBRA_K), 1.0);
    }

    #[test]
    fn blocked_shadow_ray_is_dark_and_grazing_rays_are_dimmed() {
        let mut scene = Scene::new();
        scene.push_object(
            Object::sphere(1.0)
                .with_transform(Affine::from_translation(vec3(0.0, 5.0, 0.0))),
        );
        // Straight at the sphere: fully occluded.
        let blocked = Ray::new(point3(0.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0));
        assert_eq!(scene.shadow_march(blocked, 10.0, SHADOW_PENUMBRA_K), 0.0);
        // Passing near the sphere: partially occluded but within [0, 1].
        let grazing = Ray::new(point3(1.2, 0.0, 0.0), vec3(0.0, 1.0, 0.0));
        let shadow = scene.shadow_march(grazing, 10.0, SHADOW_PENUMBRA_K);
        assert!(shadow > 0.0 && shadow < 1.0, "shadow = {shadow}");
    }

    #[test]
    fn normal_of_a_sphere_points_radially() {
        let mut scene = Scene::new();
        scene.push_object(Object::sphere(1.0));
        let normal = scene.normal_at(point3(0.0, 1.0, 0.0));
        assert_relative_eq!(normal.y, 1.0, epsilon = 1e-3);

        let diagonal = scene.normal_at(point3(0.7071, 0.7071, 0.0));
        assert_relative_eq!(diagonal.x, 0.7071, epsilon = 1e-3);
        assert_relative_eq!(diagonal.y, 0.7071, epsilon = 1e-3);
    }

    /// A fully dielectric floor beside a red sphere reflects the sphere rather than
    /// its own color; a matching matte floor does not.
    #[test]
    fn dielectric_surface_reflects() {
        let build = |surface: SurfaceInfo| {
            let mut scene = Scene::new();
            scene.push_object(
                Object::sphere(1.0)
                    .with_transform(Affine::from_translation(vec3(3.0, 1.5, 0.0)))
                    .with_color(Rgb::new(1.0, 0.0, 0.0)),
            );
            scene.push_object(
                Object::plane_at(vec3(0.0, 1.0, 0.0), -1.0)
                    .with_color(Rgb::new(0.0, 1.0, 0.0))
                    .with_surface(surface),
            );
            scene.push_light(Light::ambient(Rgb::WHITE));
            scene.set_scene_size(64, 64);
            scene
        };

        // A ray that strikes the floor at (1, -1, 0); its mirror reflection continues
        // up through (3, 1.5, 0), the center of the sphere.
        let ray = Ray::new(point3(-3.0, 4.0, 0.0), vec3(2.0, -2.5, 0.0).normalize());

        let mirror = build(SurfaceInfo {
            albedo: 0.0,
            metallic: 0.0,
            dielectric: 1.0,
        });
        let reflective_floor_color = mirror.color_for_ray(ray, MAX_REFLECTION_DEPTH);
        assert!(
            reflective_floor_color.red() > reflective_floor_color.green(),
            "expected reflection of the red sphere, got {reflective_floor_color:?}"
        );

        let matte = build(SurfaceInfo::default());
        let matte_floor_color = matte.color_for_ray(ray, MAX_REFLECTION_DEPTH);
        assert!(matte_floor_color.green() > matte_floor_color.red());
    }

    /// A surface point between the light and a blocking object is in shadow.
    #[test]
    fn occluder_casts_shadow_on_the_floor() {
        let mut scene = Scene::new();
        scene.push_object(Object::plane(vec3(0.0, 1.0, 0.0)));
        scene.push_object(
            Object::sphere(1.0)
                .with_transform(Affine::from_translation(vec3(0.0, 3.0, 0.0))),
        );
        scene.push_light(Light::point(point3(0.0, 8.0, 0.0), Rgb::WHITE));
        scene.set_scene_size(64, 64);

        let shadowed = scene.color_for_ray(
            Ray::new(point3(0.0, 4.0, -8.0), vec3(0.0, -0.45, 0.9).normalize()),
            MAX_REFLECTION_DEPTH,
        );
        let open = scene.color_for_ray(
            Ray::new(point3(6.0, 4.0, -8.0), vec3(0.0, -0.45, 0.9).normalize()),
            MAX_REFLECTION_DEPTH,
        );
        assert!(
            shadowed.red() < open.red(),
            "shadowed {shadowed:?} should be darker than open {open:?}"
        );
    }
}
