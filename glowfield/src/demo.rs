//! A ready-made animated demo scene exercising most of the crate: CSG operators,
//! procedural materials, reflective surfaces, and a moving light.

use core::f32::consts::FRAC_PI_2;

use euclid::{point3, vec3};

use crate::camera::Camera;
use crate::math::{Affine, Rgb};
use crate::scene::{Attenuation, Light, Material, Object, Scene, SurfaceInfo};

/// A torus lying in the XZ plane: the set of points `minor_radius` away from a circle
/// of `major_radius` around the Y axis.
pub fn torus(minor_radius: f32, major_radius: f32) -> Object {
    Object::custom(move |p| {
        let ring = (p.x * p.x + p.z * p.z).sqrt() - major_radius;
        (ring * ring + p.y * p.y).sqrt() - minor_radius
    })
}

/// Populates `scene` for the frame at `time` (seconds).
///
/// Suitable as the scene builder for [`Renderer::new`].
///
/// [`Renderer::new`]: crate::renderer::Renderer::new
pub fn build_scene(scene: &mut Scene, time: f32) {
    scene.set_camera(Camera::new(point3(0.0, 15.0, 15.0), point3(0.0, 0.0, 0.0)));

    scene.push_light(Light::ambient(Rgb::new(0.1, 0.1, 0.1)));
    scene.push_light(Light::directional(
        vec3(0.0, -1.0, 0.0),
        Rgb::new(0.1, 0.1, 0.2),
    ));
    scene.push_light(Light::point_attenuated(
        point3(0.0, 5.0 + (time * 3.0).sin(), 0.0),
        Rgb::new(0.9, 0.9, 0.8) * 10.0,
        Attenuation {
            linear: 0.7,
            exponential: 0.3,
            ..Attenuation::NONE
        },
    ));

    // Checkered ground.
    scene.push_object(
        Object::plane(vec3(0.0, 1.0, 0.0))
            .with_transform(Affine::from_translation(vec3(0.0, -5.0, 0.0)))
            .with_material(Material::checker(
                Rgb::from_hex(0xeeeeee),
                Rgb::from_hex(0xaaaaaa),
            )),
    );

    // A torus with a cube-shaped bite taken out of it.
    scene.push_object(
        Object::difference(vec![
            torus(1.0, 2.0),
            Object::cube(4.0).with_transform(Affine::from_translation(vec3(2.0, 0.0, 2.0))),
        ])
        .with_transform(Affine::from_translation(vec3(-6.0, 0.0, 0.0)))
        .with_surface(SurfaceInfo {
            dielectric: 0.4,
            ..SurfaceInfo::default()
        }),
    );

    // A cube and sphere melted together.
    scene.push_object(
        Object::smooth_union(
            vec![
                Object::cube(3.0)
                    .with_transform(Affine::from_translation(vec3(1.25, 0.0, 0.0)))
                    .with_color(Rgb::from_hex(0x00aaaa)),
                Object::sphere(1.5)
                    .with_transform(Affine::from_translation(vec3(-1.25, 0.0, 0.0)))
                    .with_color(Rgb::from_hex(0xaa1111)),
            ],
            0.5,
        )
        .with_transform(Affine::from_translation(vec3(6.0, 0.0, 0.0)))
        .with_surface(SurfaceInfo {
            metallic: 0.4,
            ..SurfaceInfo::default()
        }),
    );

    // A shape morphing between torus, cube, and sphere over time.
    scene.push_object(
        Object::blend(
            vec![
                torus(1.0, 2.0).with_color(Rgb::new(0.1, 0.7, 0.1)),
                Object::cube(3.0),
                Object::sphere(3.0).with_color(Rgb::new(0.5, 0.1, 0.1)),
            ],
            1.0 + (time * 3.0 - FRAC_PI_2).sin(),
        )
        .with_surface(SurfaceInfo {
            dielectric: 0.3,
            ..SurfaceInfo::default()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycast::Ray;
    use crate::tracer::MAX_REFLECTION_DEPTH;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_the_expected_scene_graph() {
        let mut scene = Scene::new();
        build_scene(&mut scene, 0.0);
        assert_eq!(scene.objects().len(), 4);
        assert_eq!(scene.lights().len(), 3);
    }

    #[test]
    fn torus_distance_on_the_ring() {
        let shape = torus(1.0, 2.0);
        // On the major circle itself: one minor radius inside the surface.
        assert_eq!(shape.distance(point3(2.0, 0.0, 0.0)), -1.0);
        // On the outer equator.
        assert_eq!(shape.distance(point3(3.0, 0.0, 0.0)), 0.0);
        // Far along the axis.
        assert!(shape.distance(point3(0.0, 10.0, 0.0)) > 8.0);
    }

    #[test]
    fn same_time_builds_an_identical_scene() {
        let build = |time| {
            let mut scene = Scene::new();
            build_scene(&mut scene, time);
            scene.set_scene_size(32, 32);
            scene
        };
        let a = build(1.25);
        let b = build(1.25);
        // Scenes are rebuilt per frame; identical inputs must shade identically.
        let ray = Ray::new(point3(0.0, 15.0, 15.0), vec3(0.0, -0.7, -0.7).normalize());
        assert_eq!(
            a.color_for_ray(ray, MAX_REFLECTION_DEPTH),
            b.color_for_ray(ray, MAX_REFLECTION_DEPTH)
        );
    }
}
