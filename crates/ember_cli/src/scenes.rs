//! Built-in scenes.

use clap::ValueEnum;
use ember_core::{CameraSettings, CheckerTexture, Color, ImageTexture};
use ember_math::Vec3;
use ember_renderer::{
    AaRect, BuildError, BvhNode, ConstantMedium, Cuboid, Dielectric, DiffuseLight, FlipFace,
    Hittable, HittableList, Lambertian, Material, Metal, RotateY, Sphere, Translate,
};
use rand::rngs::StdRng;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;

/// Scene selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Cornell box with a glass sphere, a blue box and an aluminium box
    Cornell,
    /// Cornell box holding smoke volumes
    CornellSmoke,
    /// Ground of boxes, fog, media, textured earth and a sphere cluster
    NextWeek,
    /// One emitting rectangle facing the camera
    Light,
    /// Nothing but the sky
    Empty,
}

/// Objects, sampled lights and a default view for one scene.
pub struct SceneDescription {
    pub objects: HittableList,
    pub lights: HittableList,
    pub camera: CameraSettings,
    pub background: Color,
}

impl SceneKind {
    pub fn build(self, rng: &mut StdRng, earth_texture: &Path) -> Result<SceneDescription, BuildError> {
        match self {
            SceneKind::Cornell => Ok(cornell_box()),
            SceneKind::CornellSmoke => Ok(cornell_smoke()),
            SceneKind::NextWeek => next_week(rng, earth_texture),
            SceneKind::Light => Ok(single_light()),
            SceneKind::Empty => Ok(empty()),
        }
    }
}

fn cornell_camera() -> CameraSettings {
    CameraSettings::default()
        .with_position(
            Vec3::new(278.0, 278.0, -800.0),
            Vec3::new(278.0, 278.0, 0.0),
            Vec3::Y,
        )
        .with_lens(40.0, 0.0, 10.0)
}

/// Walls of the 555 unit box, open towards the camera.
fn cornell_walls(objects: &mut HittableList, white: &Arc<dyn Material>) {
    let red: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(0.65, 0.05, 0.05)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(0.22, 0.45, 0.15)));

    objects.add(Arc::new(AaRect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green)));
    objects.add(Arc::new(AaRect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red)));
    objects.add(Arc::new(AaRect::xz(0.0, 555.0, 0.0, 555.0, 0.0, white.clone())));
    objects.add(Arc::new(AaRect::xz(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
    objects.add(Arc::new(AaRect::xy(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
}

/// Ceiling light facing down into the room.
fn ceiling_light(x0: f32, x1: f32, z0: f32, z1: f32, intensity: f32) -> Arc<dyn Hittable> {
    let light = Arc::new(DiffuseLight::from_color(Color::splat(intensity)));
    Arc::new(FlipFace::new(Arc::new(AaRect::xz(x0, x1, z0, z1, 554.0, light))))
}

fn placed(object: Arc<dyn Hittable>, angle: f32, offset: Vec3) -> Arc<dyn Hittable> {
    Arc::new(Translate::new(Arc::new(RotateY::new(object, angle)), offset))
}

pub fn cornell_box() -> SceneDescription {
    let mut objects = HittableList::new();
    let mut lights = HittableList::new();

    let white: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::splat(0.73)));
    let blue: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(0.12, 0.42, 0.75)));
    cornell_walls(&mut objects, &white);

    let light = ceiling_light(193.0, 363.0, 207.0, 352.0, 15.0);
    objects.add(light.clone());
    lights.add(light);

    let box1 = Arc::new(Cuboid::new(Vec3::ZERO, Vec3::new(165.0, 220.0, 165.0), blue));
    objects.add(placed(box1, -18.0, Vec3::new(130.0, 0.0, 65.0)));

    // The glass sphere is sampled as a light too, so caustics converge
    let glass: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Vec3::new(215.5, 300.0, 130.0),
        80.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    objects.add(glass.clone());
    lights.add(glass);

    let aluminium: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.85, 0.85), 0.0));
    let box2 = Arc::new(Cuboid::new(Vec3::ZERO, Vec3::new(165.0, 300.0, 165.0), aluminium));
    objects.add(placed(box2, 15.0, Vec3::new(300.0, 0.0, 295.0)));

    SceneDescription {
        objects,
        lights,
        camera: cornell_camera(),
        background: Color::ZERO,
    }
}

pub fn cornell_smoke() -> SceneDescription {
    let mut objects = HittableList::new();
    let mut lights = HittableList::new();

    let white: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::splat(0.73)));
    cornell_walls(&mut objects, &white);

    let light = ceiling_light(153.0, 403.0, 187.0, 372.0, 15.0);
    objects.add(light.clone());
    lights.add(light);

    let box1 = placed(
        Arc::new(Cuboid::new(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), white.clone())),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
    );
    let box2 = placed(
        Arc::new(Cuboid::new(Vec3::ZERO, Vec3::splat(165.0), white)),
        -18.0,
        Vec3::new(130.0, 0.0, 65.0),
    );

    // Glass shell with a tinted medium inside
    let boundary: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Vec3::new(185.0, 235.0, 195.0),
        70.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    objects.add(boundary.clone());
    objects.add(Arc::new(ConstantMedium::from_color(
        boundary,
        0.1,
        Color::new(0.25, 0.75, 0.4),
    )));

    objects.add(Arc::new(ConstantMedium::from_color(box1, 0.01, Color::splat(0.9))));
    objects.add(Arc::new(ConstantMedium::from_color(
        box2,
        0.01,
        Color::new(0.2, 0.4, 0.9),
    )));

    SceneDescription {
        objects,
        lights,
        camera: cornell_camera(),
        background: Color::ZERO,
    }
}

pub fn next_week(rng: &mut StdRng, earth_texture: &Path) -> Result<SceneDescription, BuildError> {
    const BOXES_PER_SIDE: usize = 20;
    const CLUSTER_SPHERES: usize = 1000;

    let mut objects = HittableList::new();
    let mut lights = HittableList::new();

    // Ground of boxes with random heights
    let ground: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(0.48, 0.83, 0.53)));
    let mut boxes: Vec<Arc<dyn Hittable>> = Vec::with_capacity(BOXES_PER_SIDE * BOXES_PER_SIDE);
    for i in 0..BOXES_PER_SIDE {
        for j in 0..BOXES_PER_SIDE {
            let w = 100.0;
            let x0 = -1000.0 + i as f32 * w;
            let z0 = -1000.0 + j as f32 * w;
            let y1 = rng.gen_range(1.0..101.0);
            boxes.push(Arc::new(Cuboid::new(
                Vec3::new(x0, 0.0, z0),
                Vec3::new(x0 + w, y1, z0 + w),
                ground.clone(),
            )));
        }
    }
    objects.add(Arc::new(BvhNode::new(boxes, rng)?));

    let light = ceiling_light(123.0, 423.0, 147.0, 412.0, 7.0);
    objects.add(light.clone());
    lights.add(light);

    objects.add(Arc::new(Sphere::new(
        Vec3::new(400.0, 400.0, 200.0),
        50.0,
        Arc::new(Lambertian::from_color(Color::new(0.7, 0.3, 0.1))),
    )));
    objects.add(Arc::new(Sphere::new(
        Vec3::new(260.0, 150.0, 45.0),
        50.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    objects.add(Arc::new(Sphere::new(
        Vec3::new(0.0, 150.0, 145.0),
        50.0,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 1.0)),
    )));

    // Subsurface: glass around a blue medium
    let boundary: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Vec3::new(360.0, 170.0, 145.0),
        70.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    objects.add(boundary.clone());
    objects.add(Arc::new(ConstantMedium::from_color(
        boundary,
        0.2,
        Color::new(0.2, 0.4, 0.9),
    )));

    // Thin fog over everything
    let fog: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Vec3::ZERO,
        5000.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    objects.add(Arc::new(ConstantMedium::from_color(fog, 0.0001, Color::splat(0.1))));

    let earth = Arc::new(ImageTexture::open_or_debug(earth_texture));
    objects.add(Arc::new(Sphere::new(
        Vec3::new(400.0, 200.0, 400.0),
        100.0,
        Arc::new(Lambertian::new(earth)),
    )));

    objects.add(Arc::new(Sphere::new(
        Vec3::new(220.0, 280.0, 300.0),
        80.0,
        Arc::new(Metal::new(Color::new(0.8, 0.88, 0.85), 0.0)),
    )));

    // Cluster of small spheres, rotated and moved as one
    let white: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::splat(0.73)));
    let cluster: Vec<Arc<dyn Hittable>> = (0..CLUSTER_SPHERES)
        .map(|_| {
            let center = Vec3::new(
                rng.gen_range(0.0..165.0),
                rng.gen_range(0.0..165.0),
                rng.gen_range(0.0..165.0),
            );
            Arc::new(Sphere::new(center, 10.0, white.clone())) as Arc<dyn Hittable>
        })
        .collect();
    objects.add(placed(
        Arc::new(BvhNode::new(cluster, rng)?),
        15.0,
        Vec3::new(-100.0, 270.0, 395.0),
    ));

    Ok(SceneDescription {
        objects,
        lights,
        camera: CameraSettings::default()
            .with_position(
                Vec3::new(478.0, 278.0, -600.0),
                Vec3::new(278.0, 278.0, 0.0),
                Vec3::Y,
            )
            .with_lens(40.0, 0.0, 10.0),
        background: Color::ZERO,
    })
}

/// A single light filling the middle of the frame above a checker floor.
pub fn single_light() -> SceneDescription {
    let mut objects = HittableList::new();
    let mut lights = HittableList::new();

    let material = Arc::new(DiffuseLight::from_color(Color::splat(4.0)));
    let light: Arc<dyn Hittable> = Arc::new(AaRect::xy(-1.0, 1.0, -1.0, 1.0, -5.0, material));
    objects.add(light.clone());
    lights.add(light);

    let checker = Arc::new(CheckerTexture::from_colors(
        Color::new(0.2, 0.3, 0.1),
        Color::splat(0.9),
        10.0,
    ));
    objects.add(Arc::new(AaRect::xz(
        -10.0,
        10.0,
        -10.0,
        0.0,
        -1.5,
        Arc::new(Lambertian::new(checker)),
    )));

    SceneDescription {
        objects,
        lights,
        camera: CameraSettings::default()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(40.0, 0.0, 5.0),
        background: Color::ZERO,
    }
}

pub fn empty() -> SceneDescription {
    SceneDescription {
        objects: HittableList::new(),
        lights: HittableList::new(),
        camera: CameraSettings::default(),
        background: Color::new(0.5, 0.7, 1.0),
    }
}
