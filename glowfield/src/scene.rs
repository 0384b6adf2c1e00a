//! The scene: everything the tracer evaluates rays against.

use crate::camera::Camera;
use crate::math::{FreePoint, LARGE_NUMBER};

mod light;
pub use light::{Attenuation, Light};

mod material;
pub use material::{CustomColorFn, Material};

mod object;
pub use object::{Composite, CsgOperator, CustomDistanceFn, Object, Primitive, SurfaceInfo};

// -------------------------------------------------------------------------------------------------

/// A complete scene: a [`Camera`], the [`Object`]s to render, and the [`Light`]s that
/// illuminate them.
///
/// The scene exclusively owns its contents. It is rebuilt from scratch for every frame
/// (see [`Renderer::update`]) rather than mutated while rendering is in flight.
///
/// [`Renderer::update`]: crate::renderer::Renderer::update
#[derive(Debug, Default)]
pub struct Scene {
    camera: Camera,
    objects: Vec<Object>,
    lights: Vec<Light>,
}

impl Scene {
    /// An empty scene with a default camera.
    pub fn new() -> Self {
        Self::default()
    }

    /// The camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the camera, e.g. to compose an extra transform onto it.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Replaces the camera.
    ///
    /// The frame lifecycle applies the buffer size to the scene after building it, so
    /// a camera set here need not know the output size yet.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Adds an object.
    pub fn push_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    /// Adds a light.
    pub fn push_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// The objects, in insertion order.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// The lights, in insertion order.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Removes all objects and lights and restores the default camera, ready for the
    /// next frame's build.
    pub fn clear(&mut self) {
        self.camera = Camera::default();
        self.objects.clear();
        self.lights.clear();
    }

    /// Propagates the output raster size to the camera.
    pub fn set_scene_size(&mut self, width: u32, height: u32) {
        self.camera.set_scene_size(width, height);
    }

    /// The smallest signed distance from `point` to any object's surface.
    ///
    /// This is the scene's own distance function: the implicit union of all top-level
    /// objects.
    #[inline]
    pub fn min_distance(&self, point: FreePoint) -> f32 {
        self.objects
            .iter()
            .fold(LARGE_NUMBER, |d, object| d.min(object.transformed_distance(point)))
    }

    /// The object whose surface is nearest to `point`, if the scene has any objects.
    pub fn closest_object(&self, point: FreePoint) -> Option<&Object> {
        let mut min_distance = LARGE_NUMBER;
        let mut closest = None;
        for object in &self.objects {
            let distance = object.transformed_distance(point);
            if distance < min_distance {
                min_distance = distance;
                closest = Some(object);
            }
        }
        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Affine, Rgb};
    use euclid::{point3, vec3};
    use pretty_assertions::assert_eq;

    #[test]
    fn min_distance_is_the_union_of_all_objects() {
        let mut scene = Scene::new();
        scene.push_object(Object::sphere(1.0));
        scene.push_object(
            Object::sphere(1.0).with_transform(Affine::from_translation(vec3(10.0, 0.0, 0.0))),
        );
        assert_eq!(scene.min_distance(point3(3.0, 0.0, 0.0)), 2.0);
        assert_eq!(scene.min_distance(point3(8.0, 0.0, 0.0)), 1.0);
    }

    #[test]
    fn empty_scene_has_no_nearby_surface() {
        let scene = Scene::new();
        assert!(scene.min_distance(point3(0.0, 0.0, 0.0)) > 1e9);
        assert!(scene.closest_object(point3(0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn closest_object_picks_by_signed_distance() {
        let mut scene = Scene::new();
        scene.push_object(Object::sphere(1.0).with_color(Rgb::new(1.0, 0.0, 0.0)));
        scene.push_object(
            Object::sphere(1.0)
                .with_color(Rgb::new(0.0, 1.0, 0.0))
                .with_transform(Affine::from_translation(vec3(4.0, 0.0, 0.0))),
        );
        let near_second = scene.closest_object(point3(3.5, 0.0, 0.0)).unwrap();
        assert_eq!(
            near_second.color_at(point3(3.5, 0.0, 0.0)),
            Rgb::new(0.0, 1.0, 0.0)
        );
    }

    #[test]
    fn clear_empties_everything() {
        let mut scene = Scene::new();
        scene.push_object(Object::sphere(1.0));
        scene.push_light(Light::ambient(Rgb::WHITE));
        scene.clear();
        assert!(scene.objects().is_empty());
        assert!(scene.lights().is_empty());
    }
}
