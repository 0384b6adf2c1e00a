//! A CPU signed-distance-field ray marcher.
//!
//! A scene is a composition of implicit surfaces — spheres, planes, cubes, custom
//! distance functions — combined with constructive solid geometry operators and lit by
//! ambient, point, and directional lights. The [`renderer`] splits the output image
//! into tiles and sphere-traces them on a pool of worker threads, exposing the pixel
//! grid for progressive preview while a frame is still in flight.
//!
//! The pieces, bottom up:
//!
//! * [`math`] — vectors, 3×4 affine transforms, unclamped linear colors.
//! * [`scene`] — [`Object`](scene::Object)s, [`Material`](scene::Material)s, and
//!   [`Light`](scene::Light)s owned by a [`Scene`](scene::Scene).
//! * [`camera`] — pixel-to-ray projection.
//! * [`tracer`] — sphere tracing, soft shadows, and recursive shading.
//! * [`renderer`] — the tiled worker pool and the per-frame lifecycle.
//! * [`demo`] — a ready-made animated scene.
//!
//! ```
//! use euclid::point3;
//! use glowfield::camera::Camera;
//! use glowfield::math::Rgb;
//! use glowfield::scene::{Light, Object, Scene};
//!
//! let mut scene = Scene::new();
//! scene.set_camera(Camera::new(point3(0.0, 0.0, -5.0), point3(0.0, 0.0, 0.0)));
//! scene.push_object(Object::sphere(1.0).with_color(Rgb::new(1.0, 0.2, 0.2)));
//! scene.push_light(Light::ambient(Rgb::new(0.8, 0.8, 0.8)));
//! scene.set_scene_size(100, 100);
//!
//! let center = scene.color_at_pixel(50, 50);
//! assert!(center.red() > center.blue());
//! ```

#![forbid(unsafe_code)]

pub mod camera;
pub mod demo;
pub mod math;
pub mod raycast;
pub mod renderer;
pub mod scene;
pub mod tracer;

// reexport for convenience of downstream crates and our tests
pub use euclid;
