//! Hittable trait and HitRecord for ray-object intersection.

use crate::sampling::gen_range_f32;
use crate::{Material, ScatterRecord};
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A dummy material used for HitRecord::default().
/// Always absorbs light (returns None from scatter).
struct DummyMaterial;

impl Material for DummyMaterial {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        None
    }
}

/// Static dummy material instance for Default impl.
static DUMMY_MATERIAL: DummyMaterial = DummyMaterial;

/// Record of a ray-object intersection.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            p: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: &DUMMY_MATERIAL,
            u: 0.0,
            v: 0.0,
            t: 0.0,
            front_face: false,
        }
    }
}

impl<'a> HitRecord<'a> {
    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
///
/// Implementations only write to the hit record when they report a hit, so
/// composites can pass one record down to all of their children.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object strictly inside `ray_t`.
    ///
    /// Returns true if hit, and fills in the hit record. `rng` is the
    /// caller's per-task generator, used by volumes.
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool;

    /// Axis-aligned bounding box, or `None` for unbounded objects.
    fn bounding_box(&self) -> Option<Aabb>;

    /// Density, with respect to solid angle at `origin`, of picking
    /// `direction` with [`Hittable::random`].
    fn pdf_value(&self, _origin: Vec3, _direction: Vec3) -> f32 {
        0.0
    }

    /// Sample a direction from `origin` towards this object.
    fn random(&self, _origin: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        Vec3::X
    }
}

/// A list of hittable objects, intersected by linear scan.
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
    bbox: Option<Aabb>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: None,
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.bbox = if self.objects.is_empty() {
            object.bounding_box()
        } else {
            match (self.bbox, object.bounding_box()) {
                (Some(a), Some(b)) => Some(Aabb::surrounding(&a, &b)),
                _ => None,
            }
        };
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Arc<dyn Hittable>] {
        &self.objects
    }

    /// Take the objects out, e.g. to build a BVH over them.
    pub fn into_objects(self) -> Vec<Arc<dyn Hittable>> {
        self.objects
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Arc<dyn Hittable>>> for HittableList {
    fn from(objects: Vec<Arc<dyn Hittable>>) -> Self {
        let mut list = Self::new();
        for object in objects {
            list.add(object);
        }
        list
    }
}

impl Hittable for HittableList {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            let interval = Interval::new(ray_t.min, closest_so_far);
            if object.hit(ray, interval, rec, rng) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        if self.objects.is_empty() {
            return 0.0;
        }

        let weight = 1.0 / self.objects.len() as f32;
        self.objects
            .iter()
            .map(|object| weight * object.pdf_value(origin, direction))
            .sum()
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::X;
        }

        let n = self.objects.len();
        let index = (gen_range_f32(rng, 0.0, n as f32) as usize).min(n - 1);
        self.objects[index].random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sphere_at(z: f32) -> Arc<dyn Hittable> {
        Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, z),
            0.5,
            Arc::new(Lambertian::from_color(Vec3::splat(0.5))),
        ))
    }

    #[test]
    fn test_list_returns_closest_hit() {
        let mut list = HittableList::new();
        // Far sphere first so the closer one has to shrink t_max
        list.add(sphere_at(-10.0));
        list.add(sphere_at(-3.0));
        list.add(sphere_at(-6.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(7);

        assert!(list.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_list_respects_window() {
        let mut list = HittableList::new();
        list.add(sphere_at(-3.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(7);

        assert!(!list.hit(&ray, Interval::new(0.001, 2.0), &mut rec, &mut rng));
    }

    #[test]
    fn test_list_bounding_box() {
        let mut list = HittableList::new();
        assert!(list.bounding_box().is_none());

        list.add(sphere_at(-3.0));
        list.add(sphere_at(3.0));
        let bbox = list.bounding_box().unwrap();
        assert_eq!(bbox.min(), Vec3::new(-0.5, -0.5, -3.5));
        assert_eq!(bbox.max(), Vec3::new(0.5, 0.5, 3.5));
    }

    #[test]
    fn test_empty_list_pdf_is_zero() {
        let list = HittableList::new();
        assert_eq!(list.pdf_value(Vec3::ZERO, Vec3::X), 0.0);
    }

    #[test]
    fn test_face_normal_orientation() {
        let mut rec = HitRecord::default();

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        rec.set_face_normal(&ray, Vec3::Z);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);

        rec.set_face_normal(&ray, -Vec3::Z);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
    }
}
