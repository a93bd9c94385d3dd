//! Direction sampling densities used by the integrator.

use crate::{hittable::Hittable, sampling::gen_f32, sampling::random_cosine_direction};
use ember_math::{Onb, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A distribution over directions that can both be sampled and evaluated.
pub trait Pdf: Send + Sync {
    /// Density of `direction` with respect to solid angle. Never negative.
    fn value(&self, direction: Vec3) -> f32;

    /// Draw a direction from this distribution.
    fn generate(&self, rng: &mut dyn RngCore) -> Vec3;
}

/// Cosine-weighted hemisphere around a surface normal.
pub struct CosinePdf {
    uvw: Onb,
}

impl CosinePdf {
    pub fn new(normal: Vec3) -> Self {
        Self {
            uvw: Onb::from_w(normal),
        }
    }
}

impl Pdf for CosinePdf {
    fn value(&self, direction: Vec3) -> f32 {
        let cosine = direction.normalize().dot(self.uvw.w());
        (cosine / PI).max(0.0)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.uvw.local(random_cosine_direction(rng))
    }
}

/// Samples directions towards a set of shapes, e.g. the scene lights.
pub struct HittablePdf<'a> {
    objects: &'a dyn Hittable,
    origin: Vec3,
}

impl<'a> HittablePdf<'a> {
    pub fn new(objects: &'a dyn Hittable, origin: Vec3) -> Self {
        Self { objects, origin }
    }
}

impl Pdf for HittablePdf<'_> {
    fn value(&self, direction: Vec3) -> f32 {
        self.objects.pdf_value(self.origin, direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.objects.random(self.origin, rng)
    }
}

/// Even blend of two densities.
///
/// `value` always reports the blended density, whichever half produced the
/// direction.
pub struct MixturePdf<'a> {
    p0: &'a dyn Pdf,
    p1: &'a dyn Pdf,
}

impl<'a> MixturePdf<'a> {
    pub fn new(p0: &'a dyn Pdf, p1: &'a dyn Pdf) -> Self {
        Self { p0, p1 }
    }
}

impl Pdf for MixturePdf<'_> {
    fn value(&self, direction: Vec3) -> f32 {
        0.5 * self.p0.value(direction) + 0.5 * self.p1.value(direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        if gen_f32(rng) < 0.5 {
            self.p0.generate(rng)
        } else {
            self.p1.generate(rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AaRect, DiffuseLight};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_cosine_pdf_samples_upper_hemisphere() {
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let pdf = CosinePdf::new(normal);
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..500 {
            let dir = pdf.generate(&mut rng);
            assert!(dir.dot(normal) >= -1e-5);
            assert!(pdf.value(dir) >= 0.0);
        }
        assert_eq!(pdf.value(-normal), 0.0);
        assert!((pdf.value(normal) - 1.0 / PI).abs() < 1e-5);
    }

    #[test]
    fn test_cosine_pdf_integrates_to_one() {
        // Uniform sphere sampling: E[value / (1 / 4pi)] = integral of value
        let pdf = CosinePdf::new(Vec3::Y);
        let mut rng = StdRng::seed_from_u64(17);
        let n = 200_000;

        let mut sum = 0.0f64;
        for _ in 0..n {
            let z = 1.0 - 2.0 * gen_f32(&mut rng);
            let r = (1.0 - z * z).max(0.0).sqrt();
            let phi = 2.0 * PI * gen_f32(&mut rng);
            let dir = Vec3::new(r * phi.cos(), r * phi.sin(), z);
            sum += (pdf.value(dir) * 4.0 * PI) as f64;
        }

        let estimate = sum / n as f64;
        assert!((estimate - 1.0).abs() < 0.02, "estimate = {estimate}");
    }

    #[test]
    fn test_mixture_value_is_mean() {
        let light: Arc<dyn Hittable> = Arc::new(AaRect::xz(
            -1.0,
            1.0,
            -1.0,
            1.0,
            3.0,
            Arc::new(DiffuseLight::from_color(Vec3::splat(4.0))),
        ));
        let origin = Vec3::ZERO;
        let cosine = CosinePdf::new(Vec3::Y);
        let towards_light = HittablePdf::new(light.as_ref(), origin);
        let mixture = MixturePdf::new(&towards_light, &cosine);
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..200 {
            let dir = mixture.generate(&mut rng);
            let expected = 0.5 * (towards_light.value(dir) + cosine.value(dir));
            assert!((mixture.value(dir) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_mixture_draws_from_both_halves() {
        let up = CosinePdf::new(Vec3::Y);
        let down = CosinePdf::new(-Vec3::Y);
        let mixture = MixturePdf::new(&up, &down);
        let mut rng = StdRng::seed_from_u64(8);

        let ups = (0..1000)
            .filter(|_| mixture.generate(&mut rng).y > 0.0)
            .count();
        assert!(ups > 400 && ups < 600, "ups = {ups}");
    }
}
