//! Instance decorators: translation, rotation about Y, and face flipping.
//!
//! Each wrapper moves the incoming ray into the child's object space, lets
//! the child intersect it, and moves the hit back into world space. Light
//! sampling (`pdf_value` / `random`) is forwarded through the same mapping
//! so a decorated emitter can still sit in the light list.

use crate::hittable::{HitRecord, Hittable};
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Moves a hittable by a fixed offset.
pub struct Translate {
    object: Arc<dyn Hittable>,
    offset: Vec3,
    bbox: Option<Aabb>,
}

impl Translate {
    pub fn new(object: Arc<dyn Hittable>, offset: Vec3) -> Self {
        let bbox = object.bounding_box().map(|b| b.translate(offset));
        Self {
            object,
            offset,
            bbox,
        }
    }
}

impl Hittable for Translate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let moved = Ray::new(ray.origin() - self.offset, ray.direction());
        if !self.object.hit(&moved, ray_t, rec, rng) {
            return false;
        }

        // Direction is unchanged, so the child's normal and front_face stand.
        rec.p += self.offset;

        true
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object.pdf_value(origin - self.offset, direction)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.object.random(origin - self.offset, rng)
    }
}

/// Rotates a hittable about the world Y axis.
pub struct RotateY {
    object: Arc<dyn Hittable>,
    sin_theta: f32,
    cos_theta: f32,
    bbox: Option<Aabb>,
}

impl RotateY {
    /// Rotate by `angle` degrees (counter-clockwise looking down -Y).
    pub fn new(object: Arc<dyn Hittable>, angle: f32) -> Self {
        let radians = angle.to_radians();
        let sin_theta = radians.sin();
        let cos_theta = radians.cos();

        let bbox = object.bounding_box().map(|b| {
            let mut min = Vec3::splat(f32::INFINITY);
            let mut max = Vec3::splat(f32::NEG_INFINITY);
            for corner in b.corners() {
                let rotated = Self::rotate(sin_theta, cos_theta, corner);
                min = min.min(rotated);
                max = max.max(rotated);
            }
            Aabb::from_points(min, max)
        });

        Self {
            object,
            sin_theta,
            cos_theta,
            bbox,
        }
    }

    /// Object space to world space.
    #[inline]
    fn rotate(sin_theta: f32, cos_theta: f32, v: Vec3) -> Vec3 {
        Vec3::new(
            cos_theta * v.x + sin_theta * v.z,
            v.y,
            -sin_theta * v.x + cos_theta * v.z,
        )
    }

    #[inline]
    fn to_world(&self, v: Vec3) -> Vec3 {
        Self::rotate(self.sin_theta, self.cos_theta, v)
    }

    #[inline]
    fn to_object(&self, v: Vec3) -> Vec3 {
        Self::rotate(-self.sin_theta, self.cos_theta, v)
    }
}

impl Hittable for RotateY {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let rotated = Ray::new(self.to_object(ray.origin()), self.to_object(ray.direction()));
        if !self.object.hit(&rotated, ray_t, rec, rng) {
            return false;
        }

        // A rotation keeps dot products, so front_face carries over as is.
        rec.p = self.to_world(rec.p);
        rec.normal = self.to_world(rec.normal);

        true
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object
            .pdf_value(self.to_object(origin), self.to_object(direction))
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.to_world(self.object.random(self.to_object(origin), rng))
    }
}

/// Reports every hit of the wrapped object as seen from the other side.
///
/// Used for ceiling lights so the emitting face points into the room.
pub struct FlipFace {
    object: Arc<dyn Hittable>,
}

impl FlipFace {
    pub fn new(object: Arc<dyn Hittable>) -> Self {
        Self { object }
    }
}

impl Hittable for FlipFace {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        if !self.object.hit(ray, ray_t, rec, rng) {
            return false;
        }

        rec.front_face = !rec.front_face;
        true
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.object.bounding_box()
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object.pdf_value(origin, direction)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.object.random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AaRect, Cuboid, DiffuseLight, Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_sphere() -> Arc<dyn Hittable> {
        Arc::new(Sphere::new(
            Vec3::ZERO,
            1.0,
            Arc::new(Lambertian::from_color(Vec3::splat(0.5))),
        ))
    }

    #[test]
    fn test_translate_moves_hit_point() {
        let moved = Translate::new(unit_sphere(), Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(moved.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 4.0).abs() < 1e-5);
        assert!((rec.p - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);

        let bbox = moved.bounding_box().unwrap();
        assert_eq!(bbox.min(), Vec3::new(-1.0, -1.0, -6.0));
    }

    #[test]
    fn test_rotate_y_box_bounds_and_hit() {
        let material = Arc::new(Lambertian::from_color(Vec3::ONE));
        let cuboid: Arc<dyn Hittable> = Arc::new(Cuboid::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 1.0),
            material,
        ));
        let rotated = RotateY::new(cuboid, 90.0);

        // +90 degrees takes +X to -Z
        let bbox = rotated.bounding_box().unwrap();
        assert!((bbox.min() - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-4);
        assert!((bbox.max() - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-4);

        // Ray down the -Z axis towards the rotated box from above
        let ray = Ray::new(Vec3::new(0.5, 5.0, -1.0), -Vec3::Y);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(rotated.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 4.0).abs() < 1e-4);
        assert!((rec.p - Vec3::new(0.5, 1.0, -1.0)).length() < 1e-4);
        assert!(rec.normal.dot(ray.direction()) < 0.0);
    }

    #[test]
    fn test_rotate_y_normal_faces_ray() {
        let rotated = RotateY::new(unit_sphere(), 33.0);
        let ray = Ray::new(Vec3::new(3.0, 0.2, 4.0), Vec3::new(-3.0, -0.2, -4.0));
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(rotated.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.p.length() - 1.0).abs() < 1e-4);
        assert!(rec.front_face);
        assert!(rec.normal.dot(ray.direction()) < 0.0);
    }

    #[test]
    fn test_flip_face_inverts_front_face_only() {
        let light = Arc::new(DiffuseLight::from_color(Vec3::splat(15.0)));
        let rect: Arc<dyn Hittable> = Arc::new(AaRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0, light));
        let flipped = FlipFace::new(rect.clone());

        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let mut rng = StdRng::seed_from_u64(1);

        let mut plain = HitRecord::default();
        assert!(rect.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut plain, &mut rng));
        let mut rec = HitRecord::default();
        assert!(flipped.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));

        assert_eq!(rec.front_face, !plain.front_face);
        assert_eq!(rec.normal, plain.normal);
        assert_eq!(rec.t, plain.t);
        assert_eq!(flipped.bounding_box(), rect.bounding_box());
    }

    #[test]
    fn test_translated_light_sampling() {
        let light = Arc::new(DiffuseLight::from_color(Vec3::splat(15.0)));
        let rect: Arc<dyn Hittable> = Arc::new(AaRect::xz(-1.0, 1.0, -1.0, 1.0, 0.0, light));
        let moved = Translate::new(rect, Vec3::new(10.0, 2.0, 0.0));
        let mut rng = StdRng::seed_from_u64(9);

        let origin = Vec3::new(10.0, 0.0, 0.0);
        for _ in 0..50 {
            let dir = moved.random(origin, &mut rng);
            let p = origin + dir;
            assert!((p.y - 2.0).abs() < 1e-4);
            assert!(moved.pdf_value(origin, dir) > 0.0);
        }
    }
}
