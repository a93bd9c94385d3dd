//! Sphere primitive for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable},
    sampling::random_to_sphere,
    Material,
};
use ember_math::{Aabb, Interval, Onb, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y
        // phi: angle around Y axis from -X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }

    /// Nearest root of the ray/sphere quadratic strictly inside `ray_t`.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        let half_b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // Smaller root first, then the larger one
        let root = (-half_b - sqrtd) / a;
        if ray_t.surrounds(root) {
            return Some(root);
        }
        let root = (-half_b + sqrtd) / a;
        if ray_t.surrounds(root) {
            return Some(root);
        }
        None
    }
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let Some(root) = self.intersect(ray, ray_t) else {
            return false;
        };

        rec.t = root;
        rec.p = ray.at(rec.t);
        let outward_normal = (rec.p - self.center) / self.radius;
        rec.set_face_normal(ray, outward_normal);
        (rec.u, rec.v) = Self::get_sphere_uv(outward_normal);
        rec.material = self.material.as_ref();

        true
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }

    /// Uniform density over the cone of directions that see the sphere.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let ray = Ray::new(origin, direction);
        if self.intersect(&ray, Interval::new(0.001, f32::INFINITY)).is_none() {
            return 0.0;
        }

        let distance_squared = (self.center - origin).length_squared();
        let cos_theta_max = (1.0 - self.radius * self.radius / distance_squared)
            .max(0.0)
            .sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);

        if solid_angle > 0.0 {
            1.0 / solid_angle
        } else {
            0.0
        }
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center - origin;
        let distance_squared = direction.length_squared();
        let uvw = Onb::from_w(direction);
        uvw.local(random_to_sphere(rng, self.radius, distance_squared))
    }
}
