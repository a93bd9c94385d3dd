//! Axis-aligned box built from six rectangles.

use crate::{
    aarect::AaRect,
    hittable::{HitRecord, Hittable, HittableList},
    Material,
};
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Box spanning the corners `p0` and `p1`, one material on every side.
pub struct Cuboid {
    bbox: Aabb,
    sides: HittableList,
}

impl Cuboid {
    pub fn new(p0: Vec3, p1: Vec3, material: Arc<dyn Material>) -> Self {
        let lo = p0.min(p1);
        let hi = p0.max(p1);

        let mut sides = HittableList::new();

        sides.add(Arc::new(AaRect::xy(lo.x, hi.x, lo.y, hi.y, hi.z, material.clone())));
        sides.add(Arc::new(AaRect::xy(lo.x, hi.x, lo.y, hi.y, lo.z, material.clone())));

        sides.add(Arc::new(AaRect::xz(lo.x, hi.x, lo.z, hi.z, hi.y, material.clone())));
        sides.add(Arc::new(AaRect::xz(lo.x, hi.x, lo.z, hi.z, lo.y, material.clone())));

        sides.add(Arc::new(AaRect::yz(lo.y, hi.y, lo.z, hi.z, hi.x, material.clone())));
        sides.add(Arc::new(AaRect::yz(lo.y, hi.y, lo.z, hi.z, lo.x, material)));

        Self {
            bbox: Aabb::from_points(lo, hi),
            sides,
        }
    }
}

impl Hittable for Cuboid {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        self.sides.hit(ray, ray_t, rec, rng)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}
