//! Thin-lens camera for ray generation.

use crate::sampling::random_in_unit_disk;
use ember_core::CameraSettings;
use ember_math::{Ray, Vec3};
use rand::RngCore;

/// Camera for generating rays into the scene. Immutable once built.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    pub fn new(settings: &CameraSettings) -> Self {
        // Calculate viewport dimensions
        let theta = settings.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = settings.aspect_ratio * viewport_height;

        // Calculate camera basis vectors
        let w = (settings.look_from - settings.look_at).normalize();
        let u = settings.vup.cross(w).normalize();
        let v = w.cross(u);

        let origin = settings.look_from;
        let horizontal = settings.focus_dist * viewport_width * u;
        let vertical = settings.focus_dist * viewport_height * v;
        let lower_left_corner =
            origin - horizontal / 2.0 - vertical / 2.0 - settings.focus_dist * w;

        Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            w,
            lens_radius: settings.aperture / 2.0,
        }
    }

    /// Ray through viewport coordinates `(s, t)`, both in `[0, 1]` from the
    /// lower left corner, leaving from a random point on the lens.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        Ray::new(
            self.origin + offset,
            self.lower_left_corner + s * self.horizontal + t * self.vertical
                - self.origin
                - offset,
        )
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Viewing direction (unit length).
    pub fn forward(&self) -> Vec3 {
        -self.w
    }
}

impl From<&CameraSettings> for Camera {
    fn from(settings: &CameraSettings) -> Self {
        Self::new(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pinhole() -> CameraSettings {
        CameraSettings::default()
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0)
            .with_aspect_ratio(2.0)
    }

    #[test]
    fn test_camera_basis() {
        let camera = Camera::new(&pinhole());

        assert_eq!(camera.origin(), Vec3::ZERO);
        assert!((camera.w - Vec3::Z).length() < 0.001);
        assert!((camera.forward() - (-Vec3::Z)).length() < 0.001);
        assert!((camera.u - Vec3::X).length() < 0.001);
        assert!((camera.v - Vec3::Y).length() < 0.001);
    }

    #[test]
    fn test_camera_ray_direction() {
        let camera = Camera::new(&pinhole());
        let mut rng = StdRng::seed_from_u64(42);

        // Center ray points straight down -Z
        let ray = camera.get_ray(0.5, 0.5, &mut rng);
        assert_eq!(ray.origin(), Vec3::ZERO);
        assert!((ray.direction().normalize() - (-Vec3::Z)).length() < 1e-5);

        // 90 degree vfov at focus 1: viewport is 2 high and 4 wide
        let corner = camera.get_ray(0.0, 0.0, &mut rng);
        assert!((corner.direction() - Vec3::new(-2.0, -1.0, -1.0)).length() < 1e-5);
        let top_right = camera.get_ray(1.0, 1.0, &mut rng);
        assert!((top_right.direction() - Vec3::new(2.0, 1.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_camera_lens_jitters_origin_within_aperture() {
        let settings = pinhole().with_lens(40.0, 0.5, 10.0);
        let camera = Camera::from(&settings);
        let mut rng = StdRng::seed_from_u64(3);

        let focus_point = camera.get_ray(0.5, 0.5, &mut rng).at(1.0);
        for _ in 0..100 {
            let ray = camera.get_ray(0.5, 0.5, &mut rng);
            assert!(ray.origin().length() <= 0.25 + 1e-5);
            assert_eq!(ray.origin().z, 0.0);
            // Every lens sample converges on the same focus point
            assert!((ray.at(1.0) - focus_point).length() < 1e-4);
        }
    }
}
