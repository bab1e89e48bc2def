//! Built-in scene used by the command line renderer and the benchmarks.

use std::num::NonZeroU32;

use nalgebra::Unit;

use crate::{
    Camera, CameraError, Scene,
    geometry::{FloatType, GeometryError, ScreenSize, WorldPoint, WorldVector},
    scene::{
        AmbientLight, Geometries, Light, Material, PointLight, Surface, TracingSettings,
        primitives::{Cylinder, Plane, Polygon, Tube},
    },
    util::{Color, WHITE},
};

/// A `rows x rows` field of small spheres on a floor, with a glass ball, a mirror,
/// a cylinder and a pillar around it.
pub fn demo_scene(rows: u32) -> Result<Scene, GeometryError> {
    let mut geometries = Geometries::new();

    let floor = Material::builder()
        .kd(WHITE * 0.6)
        .ks(WHITE * 0.1)
        .shininess(10.0)
        .kr(WHITE * 0.1)
        .build();
    geometries.add(
        Surface::new(Plane::new(WorldPoint::origin(), WorldVector::y())?).with_material(floor),
    );

    let spacing = 1.2;
    let offset = (rows as FloatType - 1.0) * spacing / 2.0;
    for (i, j) in itertools::iproduct!(0..rows, 0..rows) {
        let hue = (i * rows + j) as FloatType / (rows * rows) as FloatType;
        let color = Color::new(hue, 0.5 + 0.5 * (1.0 - hue), 1.0 - hue);
        let material = Material::builder()
            .kd(color * 0.7)
            .ks(WHITE * 0.3)
            .shininess(40.0)
            .build();
        let center = WorldPoint::new(
            i as FloatType * spacing - offset,
            0.4,
            -(j as FloatType) * spacing,
        );
        geometries.add(Surface::sphere(center, 0.4)?.with_material(material));
    }

    let glass = Material::builder()
        .kd(WHITE * 0.05)
        .ks(WHITE * 0.6)
        .shininess(200.0)
        .kt(WHITE * 0.8)
        .blurriness(0.02)
        .build();
    geometries.add(Surface::sphere(WorldPoint::new(0.0, 1.5, 3.0), 1.5)?.with_material(glass));

    let mirror = Material::builder()
        .kd(WHITE * 0.05)
        .kr(WHITE * 0.8)
        .glossiness(0.01)
        .build();
    geometries.add(
        Surface::new(Polygon::new(vec![
            WorldPoint::new(-8.0, 0.0, -20.0),
            WorldPoint::new(8.0, 0.0, -20.0),
            WorldPoint::new(8.0, 8.0, -20.0),
            WorldPoint::new(-8.0, 8.0, -20.0),
        ])?)
        .with_material(mirror),
    );

    let copper = Material::builder()
        .kd(Color::new(0.7, 0.35, 0.2))
        .ks(WHITE * 0.5)
        .shininess(60.0)
        .build();
    geometries.add(
        Surface::new(Cylinder::new(
            WorldPoint::new(5.0, 0.0, 2.0),
            WorldVector::y(),
            1.0,
            3.0,
        )?)
        .with_material(copper),
    );
    geometries.add(
        Surface::new(Tube::new(
            WorldPoint::new(-12.0, 0.0, -10.0),
            WorldVector::y(),
            0.5,
        )?)
        .with_material(Material::plastic(0.5, 0.2, 20.0)),
    );

    let mut scene = Scene::new(geometries);
    scene.background = Color::new(0.05, 0.07, 0.12);
    scene.ambient_light = AmbientLight::new(WHITE, 0.1);
    scene.lights.push(Light::Point(
        PointLight::new(WHITE * 60.0, WorldPoint::new(-6.0, 12.0, 8.0))
            .with_attenuation(1.0, 0.05, 0.05)
            .with_radius(1.0),
    ));
    scene.lights.push(Light::directional(
        Color::new(0.3, 0.3, 0.25),
        Unit::new_normalize(WorldVector::new(1.0, -1.0, -0.5)),
    ));
    scene.tracing = TracingSettings::builder()
        .max_depth(6)
        .shadow_samples(NonZeroU32::new(3).unwrap_or(NonZeroU32::MIN))
        .glossy_samples(NonZeroU32::new(2).unwrap_or(NonZeroU32::MIN))
        .build();
    Ok(scene)
}

/// Camera looking at the demo scene from the front.
pub fn demo_camera(resolution: ScreenSize, anti_aliasing: NonZeroU32) -> Result<Camera, CameraError> {
    let aspect = resolution.x as FloatType / resolution.y.max(1) as FloatType;
    Camera::builder()
        .location(WorldPoint::new(0.0, 4.0, 14.0))
        .target(WorldPoint::new(0.0, 1.0, -4.0))
        .up(WorldVector::y())
        .width(aspect * 1.2)
        .height(1.2)
        .distance(1.5)
        .resolution(resolution)
        .anti_aliasing(anti_aliasing)
        .build()
}
