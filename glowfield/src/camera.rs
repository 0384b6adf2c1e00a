//! Mapping from output pixels to world-space rays.

use euclid::vec3;

use crate::math::{Affine, FreePoint, FreeVector};
use crate::raycast::Ray;

/// Default scene size used before the renderer applies a real buffer size.
pub const DEFAULT_SCENE_SIZE: [u32; 2] = [640, 480];

/// Defines a perspective view of the scene.
///
/// A camera is a placement ([`Affine`] whose basis columns are the view's right, up,
/// and forward directions and whose translation is the eye position), a field of view,
/// and the size of the raster it projects onto. From these it derives a per-pixel scale
/// factor, `2·tan(fov/2)` distributed across the width (or the height, if the field of
/// view is vertical), and maps each pixel to a world-space [`Ray`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    transform: Affine,
    scene_width: u32,
    scene_height: u32,
    pixel_scale: f32,
    fov_degrees: f32,
    vertical_fov: bool,
}

impl Camera {
    /// The default field of view, in degrees.
    pub const DEFAULT_FOV: f32 = 45.0;

    /// A camera at `center` looking toward `look_at` with the default field of view.
    pub fn new(center: FreePoint, look_at: FreePoint) -> Self {
        Self::with_fov(center, look_at, Self::DEFAULT_FOV, false)
    }

    /// A camera at `center` looking toward `look_at`.
    ///
    /// `fov_degrees` spans the image width, or the image height if `vertical_fov` is
    /// set.
    pub fn with_fov(center: FreePoint, look_at: FreePoint, fov_degrees: f32, vertical_fov: bool) -> Self {
        let mut camera = Self {
            transform: look_toward(center, look_at),
            scene_width: DEFAULT_SCENE_SIZE[0],
            scene_height: DEFAULT_SCENE_SIZE[1],
            pixel_scale: 1.0,
            fov_degrees,
            vertical_fov,
        };
        camera.update_pixel_scale();
        camera
    }

    /// Sets the size of the raster being rendered and rederives the pixel scale.
    pub fn set_scene_size(&mut self, width: u32, height: u32) {
        self.scene_width = width;
        self.scene_height = height;
        self.update_pixel_scale();
    }

    /// Replaces the camera's placement.
    ///
    /// The basis columns are used as the view's right/up/forward directions as-is;
    /// they are expected to be orthonormal.
    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    /// The camera's placement.
    pub fn transform(&self) -> &Affine {
        &self.transform
    }

    /// World units subtended by one pixel at unit distance.
    pub fn pixel_scale(&self) -> f32 {
        self.pixel_scale
    }

    /// The world-space ray through pixel `(x, y)`.
    ///
    /// Pixels are in raster order: `(0, 0)` is the top-left of the image, so increasing
    /// `y` moves *down* the view.
    pub fn ray_for_pixel(&self, x: u32, y: u32) -> Ray {
        let h = (x as f32 - self.scene_width as f32 * 0.5) * self.pixel_scale;
        let v = -(y as f32 - self.scene_height as f32 * 0.5) * self.pixel_scale;
        let direction = self.transform.z + self.transform.x * h + self.transform.y * v;
        Ray::new(self.transform.translation().to_point(), direction.normalize())
    }

    fn update_pixel_scale(&mut self) {
        let fov_scale = (self.fov_degrees.to_radians() * 0.5).tan() * 2.0;
        let span = if self.vertical_fov {
            self.scene_height
        } else {
            self.scene_width
        };
        self.pixel_scale = fov_scale / span as f32;
    }
}

impl Default for Camera {
    /// A camera at the origin looking along `+Z`.
    fn default() -> Self {
        Self::new(FreePoint::origin(), euclid::point3(0.0, 0.0, 1.0))
    }
}

/// The placement whose translation is `center` and whose forward basis points at
/// `look_at`, with the up basis chosen to keep the view level with world up.
fn look_toward(center: FreePoint, look_at: FreePoint) -> Affine {
    let world_up: FreeVector = vec3(0.0, 1.0, 0.0);
    let forward = (look_at - center).normalize();
    let right = forward.cross(world_up).normalize();
    let up = right.cross(forward);
    Affine::from_basis(right, up, forward, center.to_vector())
}
