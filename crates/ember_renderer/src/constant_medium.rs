//! Homogeneous participating medium (smoke, fog, subsurface filler).

use crate::{
    hittable::{HitRecord, Hittable},
    material::Isotropic,
    sampling::gen_f32,
};
use ember_core::{Color, Texture};
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Offset past the entry point when searching for the exit.
const EXIT_EPSILON: f32 = 0.0001;

/// Volume of constant density bounded by a closed shape.
///
/// A ray travelling through the volume scatters after an exponentially
/// distributed free path; otherwise it passes straight through.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    neg_inv_density: f32,
    phase_function: Isotropic,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Hittable>, density: f32, albedo: Arc<dyn Texture>) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Isotropic::new(albedo),
        }
    }

    pub fn from_color(boundary: Arc<dyn Hittable>, density: f32, albedo: Color) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Isotropic::from_color(albedo),
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let mut entry = HitRecord::default();
        if !self.boundary.hit(ray, Interval::UNIVERSE, &mut entry, rng) {
            return false;
        }

        let mut exit = HitRecord::default();
        if !self.boundary.hit(
            ray,
            Interval::new(entry.t + EXIT_EPSILON, f32::INFINITY),
            &mut exit,
            rng,
        ) {
            return false;
        }

        let mut t1 = entry.t.max(ray_t.min);
        let t2 = exit.t.min(ray_t.max);
        if t1 >= t2 {
            return false;
        }
        t1 = t1.max(0.0);

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t2 - t1) * ray_length;
        let hit_distance = self.neg_inv_density * gen_f32(rng).ln();

        if hit_distance > distance_inside_boundary {
            return false;
        }

        rec.t = t1 + hit_distance / ray_length;
        rec.p = ray.at(rec.t);
        // Arbitrary: a volume has no surface orientation
        rec.normal = Vec3::X;
        rec.front_face = true;
        rec.material = &self.phase_function;

        true
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.boundary.bounding_box()
    }
}
