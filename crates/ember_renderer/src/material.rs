//! Material trait for surface scattering.

use crate::{
    hittable::HitRecord,
    pdf::{CosinePdf, Pdf},
    sampling::{gen_f32, random_in_unit_sphere},
};
use ember_core::{Color, SolidColor, Texture};
use ember_math::{Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// Outcome of a ray scattering off a material.
pub enum ScatterRecord {
    /// The outgoing ray is already chosen; follow it without density weighting.
    Specular { attenuation: Color, ray: Ray },
    /// The outgoing direction is to be drawn from `pdf`.
    Diffuse {
        attenuation: Color,
        pdf: Box<dyn Pdf>,
    },
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns None if the ray is absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord>;

    /// Density of the material's own scattering lobe for `scattered`.
    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        0.0
    }

    /// Get emitted light from this material.
    ///
    /// Most materials return black (no emission).
    fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord, _u: f32, _v: f32, _p: Vec3) -> Color {
        Color::ZERO
    }
}

/// Lambertian (diffuse) material.
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    /// Lambertian with a constant albedo.
    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord::Diffuse {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            pdf: Box::new(CosinePdf::new(rec.normal)),
        })
    }

    fn scattering_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        let cosine = rec.normal.dot(scattered.direction().normalize());
        (cosine / PI).max(0.0)
    }
}

/// Metal (specular) material.
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let direction = reflected + self.fuzz * random_in_unit_sphere(rng);

        Some(ScatterRecord::Specular {
            attenuation: self.albedo,
            ray: Ray::new(rec.p, direction),
        })
    }
}

/// Dielectric (glass) material.
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng)
        {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        Some(ScatterRecord::Specular {
            attenuation: Color::ONE,
            ray: Ray::new(rec.p, direction),
        })
    }
}

/// Diffuse light emitter. Emits from its front face only.
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    pub fn new(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }

    pub fn from_color(emit: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(emit)))
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        // Lights don't scatter rays
        None
    }

    fn emitted(&self, _ray_in: &Ray, rec: &HitRecord, u: f32, v: f32, p: Vec3) -> Color {
        if rec.front_face {
            self.emit.value(u, v, p)
        } else {
            Color::ZERO
        }
    }
}

/// Phase function of a participating medium: scatters uniformly in all
/// directions.
pub struct Isotropic {
    albedo: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Isotropic {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord::Specular {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            ray: Ray::new(rec.p, random_in_unit_sphere(rng)),
        })
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a vector through a surface.
#[inline]
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record_facing(normal: Vec3, front_face: bool) -> HitRecord<'static> {
        HitRecord {
            p: Vec3::ZERO,
            normal,
            front_face,
            ..HitRecord::default()
        }
    }

    #[test]
    fn test_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        let n = Vec3::Y;
        assert_eq!(reflect(v, n), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_refract_straight_through() {
        let out = refract(-Vec3::Y, Vec3::Y, 1.0 / 1.5);
        assert!((out - (-Vec3::Y)).length() < 1e-5);
    }

    #[test]
    fn test_lambertian_scatter_is_diffuse() {
        let material = Lambertian::from_color(Color::new(0.2, 0.4, 0.6));
        let rec = record_facing(Vec3::Y, true);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y);
        let mut rng = StdRng::seed_from_u64(1);

        match material.scatter(&ray, &rec, &mut rng) {
            Some(ScatterRecord::Diffuse { attenuation, pdf }) => {
                assert_eq!(attenuation, Color::new(0.2, 0.4, 0.6));
                let dir = pdf.generate(&mut rng);
                assert!(dir.dot(Vec3::Y) >= -1e-5);
            }
            _ => panic!("lambertian should scatter diffusely"),
        }

        let up = Ray::new(Vec3::ZERO, Vec3::Y);
        let down = Ray::new(Vec3::ZERO, -Vec3::Y);
        assert!((material.scattering_pdf(&ray, &rec, &up) - 1.0 / PI).abs() < 1e-6);
        assert_eq!(material.scattering_pdf(&ray, &rec, &down), 0.0);
    }

    #[test]
    fn test_metal_mirror() {
        let material = Metal::new(Color::splat(0.8), 0.0);
        let rec = record_facing(Vec3::Y, true);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(1);

        match material.scatter(&ray, &rec, &mut rng) {
            Some(ScatterRecord::Specular { attenuation, ray }) => {
                assert_eq!(attenuation, Color::splat(0.8));
                let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
                assert!((ray.direction() - expected).length() < 1e-5);
            }
            _ => panic!("metal should scatter specularly"),
        }
    }

    #[test]
    fn test_metal_fuzz_is_clamped() {
        let material = Metal::new(Color::ONE, 7.0);
        assert_eq!(material.fuzz, 1.0);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let material = Dielectric::new(1.5);
        // Inside the glass at a grazing angle
        let rec = record_facing(Vec3::Y, false);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, -0.1, 0.0));
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..20 {
            match material.scatter(&ray, &rec, &mut rng) {
                Some(ScatterRecord::Specular { attenuation, ray }) => {
                    assert_eq!(attenuation, Color::ONE);
                    assert!(ray.direction().y > 0.0);
                }
                _ => panic!("dielectric should scatter specularly"),
            }
        }
    }

    #[test]
    fn test_diffuse_light_front_face_only() {
        let material = DiffuseLight::from_color(Color::splat(15.0));
        let ray = Ray::new(Vec3::ZERO, -Vec3::Y);
        let mut rng = StdRng::seed_from_u64(1);

        let front = record_facing(Vec3::Y, true);
        let back = record_facing(Vec3::Y, false);
        assert_eq!(
            material.emitted(&ray, &front, 0.0, 0.0, Vec3::ZERO),
            Color::splat(15.0)
        );
        assert_eq!(material.emitted(&ray, &back, 0.0, 0.0, Vec3::ZERO), Color::ZERO);
        assert!(material.scatter(&ray, &front, &mut rng).is_none());
    }

    #[test]
    fn test_isotropic_scatters_from_hit_point() {
        let material = Isotropic::from_color(Color::splat(0.5));
        let mut rec = record_facing(Vec3::X, true);
        rec.p = Vec3::new(1.0, 2.0, 3.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut rng = StdRng::seed_from_u64(1);

        match material.scatter(&ray, &rec, &mut rng) {
            Some(ScatterRecord::Specular { attenuation, ray }) => {
                assert_eq!(attenuation, Color::splat(0.5));
                assert_eq!(ray.origin(), rec.p);
                assert!(ray.direction().length() < 1.0);
            }
            _ => panic!("isotropic should scatter specularly"),
        }
    }
}
