//! End-to-end tests of the renderer's frame lifecycle.

use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use euclid::point3;
use pretty_assertions::assert_eq;

use glowfield::camera::Camera;
use glowfield::math::Rgb;
use glowfield::renderer::{Renderer, SceneBuilderFn};
use glowfield::scene::{Light, Object, Scene};
use glowfield::tracer::BACKGROUND_COLOR;

/// A sphere in front of the camera under white ambient light.
fn sphere_scene_builder() -> SceneBuilderFn {
    Box::new(|scene: &mut Scene, _time: f32| {
        scene.set_camera(Camera::new(point3(0.0, 0.0, -5.0), point3(0.0, 0.0, 0.0)));
        scene.push_object(Object::sphere(1.0));
        scene.push_light(Light::ambient(Rgb::new(0.5, 0.5, 0.5)));
    })
}

fn wait_until_done(renderer: &Renderer) {
    let deadline = Instant::now() + Duration::from_secs(60);
    while !renderer.is_done() {
        assert!(
            Instant::now() < deadline,
            "renderer did not finish in time"
        );
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn fresh_renderer_is_done_and_empty() {
    let renderer = Renderer::with_parallelism(2, sphere_scene_builder());
    assert!(renderer.is_done());
    assert_eq!(renderer.size(), (0, 0));
    assert_eq!(renderer.tile_count(), 0);
}

#[test]
fn a_frame_renders_to_completion() {
    let mut renderer = Renderer::with_parallelism(4, sphere_scene_builder());
    renderer.resize(64, 48);
    renderer.update(0.1);
    renderer.render_frame();
    assert!(renderer.tile_count() > 0);
    wait_until_done(&renderer);

    let frame = renderer.frame();
    // The sphere fills the center of the view under 0.5 ambient light.
    assert_eq!(frame.get(32, 24), Rgb::new(0.5, 0.5, 0.5));
    // The corners see only background.
    assert_eq!(frame.get(0, 0), BACKGROUND_COLOR);
    assert_eq!(frame.get(63, 47), BACKGROUND_COLOR);
}

#[test]
fn rendering_the_same_frame_twice_is_bit_identical() {
    let mut renderer = Renderer::with_parallelism(3, sphere_scene_builder());
    renderer.resize(48, 32);
    renderer.update(0.25);
    renderer.render_frame();
    wait_until_done(&renderer);
    let first = renderer.frame().to_rgba8();

    // Advance by zero so the rebuilt scene is at the identical time.
    renderer.update(0.0);
    renderer.render_frame();
    wait_until_done(&renderer);
    let second = renderer.frame().to_rgba8();

    assert_eq!(first, second);
}

#[test]
fn zero_sized_resize_is_ignored() {
    let mut renderer = Renderer::with_parallelism(2, sphere_scene_builder());
    renderer.resize(0, 100);
    renderer.resize(100, 0);
    assert_eq!(renderer.size(), (0, 0));
    // With no buffer there is nothing to schedule.
    renderer.update(0.1);
    renderer.render_frame();
    assert_eq!(renderer.tile_count(), 0);
    assert!(renderer.is_done());
}

#[test]
fn resize_reallocates_and_neutral_fills() {
    let mut renderer = Renderer::with_parallelism(2, sphere_scene_builder());
    renderer.resize(32, 32);
    renderer.update(0.1);
    renderer.render_frame();
    wait_until_done(&renderer);

    renderer.resize(48, 32);
    assert!(renderer.is_done());
    assert_eq!(renderer.size(), (48, 32));
    // A changed size discards old pixels in favor of the neutral fill.
    assert_eq!(renderer.frame().get(0, 0), Rgb::new(0.5, 0.6, 0.7));

    // Resizing to the same size keeps the buffer contents.
    renderer.update(0.1);
    renderer.render_frame();
    wait_until_done(&renderer);
    let before = renderer.frame().get(24, 16);
    renderer.resize(48, 32);
    assert_eq!(renderer.frame().get(24, 16), before);
}

#[test]
fn cancel_when_idle_is_a_no_op() {
    let renderer = Renderer::with_parallelism(2, sphere_scene_builder());
    renderer.cancel();
    assert!(renderer.is_done());
}

/// Blocks every distance evaluation on a shared gate, keeping a frame verifiably
/// in flight until the test opens it.
fn gated_scene_builder(gate: Arc<(Mutex<bool>, Condvar)>) -> SceneBuilderFn {
    Box::new(move |scene: &mut Scene, _time: f32| {
        let gate = Arc::clone(&gate);
        scene.set_camera(Camera::new(point3(0.0, 0.0, -5.0), point3(0.0, 0.0, 0.0)));
        scene.push_object(Object::custom(move |p| {
            let (lock, condvar) = &*gate;
            let mut open = lock.lock().unwrap();
            while !*open {
                open = condvar.wait(open).unwrap();
            }
            drop(open);
            p.to_vector().length() - 1.0
        }));
        scene.push_light(Light::ambient(Rgb::WHITE));
    })
}

#[test]
fn update_and_render_frame_are_no_ops_while_in_flight() {
    let gate = Arc::new((Mutex::new(false), Condvar::new()));
    let mut renderer = Renderer::with_parallelism(2, gated_scene_builder(Arc::clone(&gate)));
    renderer.resize(16, 16);
    renderer.update(1.0);
    assert_eq!(renderer.time(), 1.0);
    renderer.render_frame();

    // Every tile needs at least one gated distance evaluation, so nothing can finish.
    assert!(!renderer.is_done());
    renderer.update(5.0);
    assert_eq!(renderer.time(), 1.0, "update must not advance time mid-frame");
    renderer.render_frame(); // must not restart the schedule

    {
        let (lock, condvar) = &*gate;
        *lock.lock().unwrap() = true;
        condvar.notify_all();
    }
    wait_until_done(&renderer);
    assert_eq!(renderer.time(), 1.0);
}
