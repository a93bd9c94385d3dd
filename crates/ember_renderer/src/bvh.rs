//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of bounding boxes. Each node splits its objects in half
//! along a randomly chosen axis, ordered by the minimum of their boxes.

use crate::hittable::{HitRecord, Hittable};
use ember_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};
use std::cmp::Ordering;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building a BVH.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error("cannot build a BVH over zero objects")]
    Empty,

    #[error("object without a bounding box cannot be placed in a BVH")]
    MissingBoundingBox,
}

/// BVH node with two children and the box surrounding both.
///
/// A node over a single object holds it on both sides.
pub struct BvhNode {
    left: Arc<dyn Hittable>,
    right: Arc<dyn Hittable>,
    bbox: Aabb,
}

impl std::fmt::Debug for BvhNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BvhNode").field("bbox", &self.bbox).finish()
    }
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    pub fn new(mut objects: Vec<Arc<dyn Hittable>>, rng: &mut dyn RngCore) -> Result<Self, BuildError> {
        let end = objects.len();
        let node = Self::build(&mut objects, 0, end, rng)?;
        log::debug!("BVH built over {} objects", end);
        Ok(node)
    }

    /// Build a node over `objects[start..end]`, reordering that range.
    pub fn build(
        objects: &mut [Arc<dyn Hittable>],
        start: usize,
        end: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Self, BuildError> {
        if start >= end || end > objects.len() {
            return Err(BuildError::Empty);
        }

        let axis = rng.gen_range(0..3);
        let span = end - start;

        let (left, right): (Arc<dyn Hittable>, Arc<dyn Hittable>) = match span {
            1 => (objects[start].clone(), objects[start].clone()),
            2 => {
                let (a, b) = (&objects[start], &objects[start + 1]);
                if box_compare(a.as_ref(), b.as_ref(), axis)? == Ordering::Greater {
                    (b.clone(), a.clone())
                } else {
                    (a.clone(), b.clone())
                }
            }
            _ => {
                let range = &mut objects[start..end];

                // Every box must exist before the sort can compare them
                let mut keys = Vec::with_capacity(span);
                for object in range.iter() {
                    let bbox = object.bounding_box().ok_or(BuildError::MissingBoundingBox)?;
                    keys.push(bbox.axis_interval(axis).min);
                }
                let mut order: Vec<usize> = (0..span).collect();
                order.sort_by(|&i, &j| keys[i].partial_cmp(&keys[j]).unwrap_or(Ordering::Equal));
                let sorted: Vec<Arc<dyn Hittable>> =
                    order.iter().map(|&i| range[i].clone()).collect();
                range.clone_from_slice(&sorted);

                let mid = start + span / 2;
                let left = Self::build(objects, start, mid, rng)?;
                let right = Self::build(objects, mid, end, rng)?;
                (Arc::new(left), Arc::new(right))
            }
        };

        let box_left = left.bounding_box().ok_or(BuildError::MissingBoundingBox)?;
        let box_right = right.bounding_box().ok_or(BuildError::MissingBoundingBox)?;

        Ok(Self {
            left,
            right,
            bbox: Aabb::surrounding(&box_left, &box_right),
        })
    }
}

/// Order two objects by the minimum of their boxes along `axis`.
fn box_compare(a: &dyn Hittable, b: &dyn Hittable, axis: usize) -> Result<Ordering, BuildError> {
    let box_a = a.bounding_box().ok_or(BuildError::MissingBoundingBox)?;
    let box_b = b.bounding_box().ok_or(BuildError::MissingBoundingBox)?;

    Ok(box_a
        .axis_interval(axis)
        .min
        .partial_cmp(&box_b.axis_interval(axis).min)
        .unwrap_or(Ordering::Equal))
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        if !self.bbox.hit(ray, ray_t) {
            return false;
        }

        let hit_left = self.left.hit(ray, ray_t, rec, rng);

        // One-object leaf: a second query would redraw a volume's free path
        if Arc::ptr_eq(&self.left, &self.right) {
            return hit_left;
        }

        // Only check right up to closest hit
        let right_max = if hit_left { rec.t } else { ray_t.max };
        let hit_right = self
            .right
            .hit(ray, Interval::new(ray_t.min, right_max), rec, rng);

        hit_left || hit_right
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstantMedium, HittableList, Lambertian, Sphere};
    use ember_core::Color;
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Hittable with no bounding box.
    struct Unbounded;

    impl Hittable for Unbounded {
        fn hit<'a>(
            &'a self,
            _ray: &Ray,
            _ray_t: Interval,
            _rec: &mut HitRecord<'a>,
            _rng: &mut dyn RngCore,
        ) -> bool {
            false
        }

        fn bounding_box(&self) -> Option<Aabb> {
            None
        }
    }

    fn sphere(center: Vec3) -> Arc<dyn Hittable> {
        Arc::new(Sphere::new(
            center,
            0.5,
            Arc::new(Lambertian::from_color(Color::new(0.5, 0.5, 0.5))),
        ))
    }

    #[test]
    fn test_bvh_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(BvhNode::new(vec![], &mut rng).unwrap_err(), BuildError::Empty);
    }

    #[test]
    fn test_bvh_single_sphere() {
        let mut rng = StdRng::seed_from_u64(0);
        let bvh = BvhNode::new(vec![sphere(Vec3::new(0.0, 0.0, -1.0))], &mut rng).unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let mut rng = StdRng::seed_from_u64(0);
        let spheres = (0..10)
            .map(|i| sphere(Vec3::new(i as f32, 0.0, -5.0)))
            .collect();
        let bvh = BvhNode::new(spheres, &mut rng).unwrap();

        // Test ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((rec.p.z - (-4.5)).abs() < 0.01);

        let bbox = bvh.bounding_box().unwrap();
        assert_eq!(bbox.min(), Vec3::new(-0.5, -0.5, -5.5));
        assert_eq!(bbox.max(), Vec3::new(9.5, 0.5, -4.5));
    }

    #[test]
    fn test_bvh_rejects_unbounded_object() {
        let mut rng = StdRng::seed_from_u64(0);
        let objects: Vec<Arc<dyn Hittable>> = vec![
            sphere(Vec3::ZERO),
            Arc::new(Unbounded),
            sphere(Vec3::X * 2.0),
            sphere(Vec3::X * 4.0),
        ];
        assert_eq!(
            BvhNode::new(objects, &mut rng).unwrap_err(),
            BuildError::MissingBoundingBox
        );

        let pair: Vec<Arc<dyn Hittable>> = vec![sphere(Vec3::ZERO), Arc::new(Unbounded)];
        assert_eq!(
            BvhNode::new(pair, &mut rng).unwrap_err(),
            BuildError::MissingBoundingBox
        );
    }

    #[test]
    fn test_bvh_matches_list_closest_hit() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut list = HittableList::new();
        let mut objects = Vec::new();
        for i in 0..40 {
            let center = Vec3::new((i % 8) as f32 * 1.5, (i / 8) as f32 * 1.5, -(i % 3) as f32 * 2.0);
            let s = sphere(center);
            list.add(s.clone());
            objects.push(s);
        }
        objects.push(Arc::new(ConstantMedium::from_color(
            sphere(Vec3::new(20.0, 0.0, 0.0)),
            0.5,
            Color::ONE,
        )));
        let bvh = BvhNode::new(objects, &mut rng).unwrap();

        for i in 0..40 {
            let target = Vec3::new((i % 8) as f32 * 1.5, (i / 8) as f32 * 1.5, -3.0);
            let ray = Ray::new(Vec3::new(3.0, 3.0, 10.0), target - Vec3::new(3.0, 3.0, 10.0));
            let interval = Interval::new(0.001, f32::INFINITY);

            let mut from_list = HitRecord::default();
            let mut from_bvh = HitRecord::default();
            let hit_list = list.hit(&ray, interval, &mut from_list, &mut rng);
            let hit_bvh = bvh.hit(&ray, interval, &mut from_bvh, &mut rng);

            assert_eq!(hit_list, hit_bvh);
            if hit_list {
                assert!((from_list.t - from_bvh.t).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_bvh_leaf_keeps_medium_density() {
        let medium: Arc<dyn Hittable> = Arc::new(ConstantMedium::from_color(
            Arc::new(Sphere::new(
                Vec3::ZERO,
                1.0,
                Arc::new(Lambertian::from_color(Color::ONE)),
            )),
            0.2,
            Color::ONE,
        ));
        let mut rng = StdRng::seed_from_u64(21);
        let single = BvhNode::new(vec![medium.clone()], &mut rng).unwrap();
        let with_neighbours = BvhNode::new(
            vec![
                medium.clone(),
                sphere(Vec3::new(10.0, 0.0, 0.0)),
                sphere(Vec3::new(20.0, 0.0, 0.0)),
            ],
            &mut rng,
        )
        .unwrap();

        // Straight through the center: two units inside the medium
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let interval = Interval::new(0.001, f32::INFINITY);
        let expected = 1.0 - (-0.2f32 * 2.0).exp();

        let n = 20_000;
        let frequency = |object: &dyn Hittable, rng: &mut StdRng| {
            let hits = (0..n)
                .filter(|_| object.hit(&ray, interval, &mut HitRecord::default(), rng))
                .count();
            hits as f32 / n as f32
        };

        let direct = frequency(medium.as_ref(), &mut rng);
        let through_single = frequency(&single, &mut rng);
        let through_tree = frequency(&with_neighbours, &mut rng);

        assert!((direct - expected).abs() < 0.02, "direct {direct} vs {expected}");
        assert!((through_single - expected).abs() < 0.02, "single {through_single} vs {expected}");
        assert!((through_tree - expected).abs() < 0.02, "tree {through_tree} vs {expected}");
    }
}
