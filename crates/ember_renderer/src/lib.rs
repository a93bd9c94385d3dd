//! Ember renderer - CPU path tracing
//!
//! A Monte Carlo path tracer with BVH acceleration, light importance
//! sampling and homogeneous participating media.

mod aarect;
mod bucket;
mod bvh;
mod camera;
mod constant_medium;
mod cuboid;
mod hittable;
mod material;
mod pdf;
mod renderer;
pub mod sampling;
mod sphere;
mod transform;

pub use aarect::{AaRect, Plane};
pub use bucket::{
    generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE,
};
pub use bvh::{BuildError, BvhNode};
pub use camera::Camera;
pub use constant_medium::ConstantMedium;
pub use cuboid::Cuboid;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterRecord};
pub use pdf::{CosinePdf, HittablePdf, MixturePdf, Pdf};
pub use renderer::{
    color_to_rgb, linear_to_gamma, ray_color, render, render_pixel, zero_non_finite, ImageBuffer,
    OutputError, RenderConfig, Scene,
};
pub use sphere::Sphere;
pub use transform::{FlipFace, RotateY, Translate};

/// Re-export Vec3 and common math types from ember_math
pub use ember_core::Color;
pub use ember_math::{Aabb, Interval, Ray, Vec3};
