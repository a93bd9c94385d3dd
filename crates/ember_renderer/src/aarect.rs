//! Axis-aligned rectangles.

use crate::{
    hittable::{HitRecord, Hittable},
    sampling::gen_range_f32,
    Material,
};
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Half thickness given to a rectangle's box along its normal axis.
const PLANE_PADDING: f32 = 0.0001;

/// Which plane the rectangle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Constant z; spans x (a) and y (b)
    Xy,
    /// Constant y; spans x (a) and z (b)
    Xz,
    /// Constant x; spans y (a) and z (b)
    Yz,
}

impl Plane {
    /// Axis indices `(normal, a, b)`.
    #[inline]
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::Xy => (2, 0, 1),
            Plane::Xz => (1, 0, 2),
            Plane::Yz => (0, 1, 2),
        }
    }
}

/// Rectangle `[a0, a1] x [b0, b1]` in the plane `axis = k`.
///
/// The outward normal is the positive normal axis.
pub struct AaRect {
    plane: Plane,
    a0: f32,
    a1: f32,
    b0: f32,
    b1: f32,
    k: f32,
    material: Arc<dyn Material>,
}

impl AaRect {
    pub fn new(
        plane: Plane,
        (a0, a1): (f32, f32),
        (b0, b1): (f32, f32),
        k: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            plane,
            a0: a0.min(a1),
            a1: a0.max(a1),
            b0: b0.min(b1),
            b1: b0.max(b1),
            k,
            material,
        }
    }

    /// Rectangle at `z = k` spanning `x0..x1`, `y0..y1`.
    pub fn xy(x0: f32, x1: f32, y0: f32, y1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::Xy, (x0, x1), (y0, y1), k, material)
    }

    /// Rectangle at `y = k` spanning `x0..x1`, `z0..z1`.
    pub fn xz(x0: f32, x1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::Xz, (x0, x1), (z0, z1), k, material)
    }

    /// Rectangle at `x = k` spanning `y0..y1`, `z0..z1`.
    pub fn yz(y0: f32, y1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::Yz, (y0, y1), (z0, z1), k, material)
    }

    pub fn area(&self) -> f32 {
        (self.a1 - self.a0) * (self.b1 - self.b0)
    }

    fn outward_normal(&self) -> Vec3 {
        match self.plane {
            Plane::Xy => Vec3::Z,
            Plane::Xz => Vec3::Y,
            Plane::Yz => Vec3::X,
        }
    }

    /// Plane crossing inside `ray_t` and inside the rectangle bounds.
    ///
    /// Returns `(t, a, b)` with `a`, `b` the in-plane coordinates.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<(f32, f32, f32)> {
        let (n, ia, ib) = self.plane.axes();
        let origin = ray.origin();
        let direction = ray.direction();

        let t = (self.k - origin[n]) / direction[n];
        if !ray_t.surrounds(t) {
            return None;
        }

        let a = origin[ia] + t * direction[ia];
        let b = origin[ib] + t * direction[ib];
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return None;
        }

        Some((t, a, b))
    }
}

impl Hittable for AaRect {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let Some((t, a, b)) = self.intersect(ray, ray_t) else {
            return false;
        };

        rec.u = (a - self.a0) / (self.a1 - self.a0);
        rec.v = (b - self.b0) / (self.b1 - self.b0);
        rec.t = t;
        rec.set_face_normal(ray, self.outward_normal());
        rec.material = self.material.as_ref();
        rec.p = ray.at(t);

        true
    }

    fn bounding_box(&self) -> Option<Aabb> {
        let (n, ia, ib) = self.plane.axes();
        let mut lo = Vec3::ZERO;
        let mut hi = Vec3::ZERO;

        lo[ia] = self.a0;
        hi[ia] = self.a1;
        lo[ib] = self.b0;
        hi[ib] = self.b1;
        lo[n] = self.k - PLANE_PADDING;
        hi[n] = self.k + PLANE_PADDING;

        Some(Aabb::from_points(lo, hi))
    }

    /// Area light density converted to solid angle: `dist^2 / (|cos| * area)`.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let ray = Ray::new(origin, direction);
        let Some((t, _, _)) = self.intersect(&ray, Interval::new(0.001, f32::INFINITY)) else {
            return 0.0;
        };

        let distance_squared = t * t * direction.length_squared();
        let cosine = (direction.dot(self.outward_normal()) / direction.length()).abs();
        let denom = cosine * self.area();

        if denom > 0.0 {
            distance_squared / denom
        } else {
            0.0
        }
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let (n, ia, ib) = self.plane.axes();
        let mut point = Vec3::ZERO;
        point[ia] = gen_range_f32(rng, self.a0, self.a1);
        point[ib] = gen_range_f32(rng, self.b0, self.b1);
        point[n] = self.k;
        point - origin
    }
}
