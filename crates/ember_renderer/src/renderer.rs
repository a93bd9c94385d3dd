//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive radiance estimation with configurable depth
//! - Light sampling mixed evenly with material sampling
//! - Gamma correction and a non-finite guard on output

use crate::{
    hittable::{HitRecord, Hittable, HittableList},
    material::ScatterRecord,
    pdf::{HittablePdf, MixturePdf, Pdf},
    sampling::gen_f32,
    Camera,
};
use ember_core::{Color, RenderSettings};
use ember_math::{Interval, Ray};
use rand::RngCore;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Nearest distance accepted for a hit; keeps bounced rays off their origin.
const T_MIN: f32 = 0.001;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_width: u32,
    pub image_height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Square bucket edge in pixels for the parallel renderer
    pub bucket_size: u32,
    /// Base seed; every bucket derives its own generator from it
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 500,
            image_height: 500,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
            bucket_size: crate::bucket::DEFAULT_BUCKET_SIZE,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Build a config from loaded settings for a camera of `aspect_ratio`.
    ///
    /// `background` is used when the settings do not set one.
    pub fn from_settings(settings: &RenderSettings, aspect_ratio: f32, background: Color) -> Self {
        Self {
            image_width: settings.image_width,
            image_height: settings.image_height(aspect_ratio),
            samples_per_pixel: settings.samples_per_pixel,
            max_depth: settings.max_depth,
            background: settings.background.unwrap_or(background),
            bucket_size: settings.bucket_size,
            seed: settings.seed,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples;
        self.max_depth = max_depth;
        self
    }

    /// Set background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Everything the integrator shoots rays at.
///
/// `lights` holds the shapes worth sampling directly. They usually also
/// appear in `world`.
pub struct Scene {
    pub world: Arc<dyn Hittable>,
    pub lights: HittableList,
}

impl Scene {
    pub fn new(world: Arc<dyn Hittable>, lights: HittableList) -> Self {
        Self { world, lights }
    }
}

/// Compute the color seen by a ray.
///
/// One-sample estimate of the rendering equation. Diffuse bounces draw
/// their direction from an even mixture of light sampling and the
/// material's own density.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    lights: &HittableList,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let mut rec = HitRecord::default();
    if !world.hit(ray, Interval::new(T_MIN, f32::INFINITY), &mut rec, rng) {
        return config.background;
    }

    let emitted = rec.material.emitted(ray, &rec, rec.u, rec.v, rec.p);

    let Some(scatter) = rec.material.scatter(ray, &rec, rng) else {
        return emitted;
    };

    match scatter {
        ScatterRecord::Specular { attenuation, ray } => {
            attenuation * ray_color(&ray, world, lights, depth - 1, config, rng)
        }
        ScatterRecord::Diffuse { attenuation, pdf } => {
            let (direction, pdf_val) = if lights.is_empty() {
                let direction = pdf.generate(rng);
                (direction, pdf.value(direction))
            } else {
                let light_pdf = HittablePdf::new(lights, rec.p);
                let mixture = MixturePdf::new(&light_pdf, pdf.as_ref());
                let direction = mixture.generate(rng);
                (direction, mixture.value(direction))
            };

            // Zero or undefined density: the sample carries no information
            if !(pdf_val.is_finite() && pdf_val > 0.0) {
                return emitted;
            }

            let scattered = Ray::new(rec.p, direction);
            let scattering_pdf = rec.material.scattering_pdf(ray, &rec, &scattered);
            let incoming = ray_color(&scattered, world, lights, depth - 1, config, rng);

            emitted + attenuation * scattering_pdf * incoming / pdf_val
        }
    }
}

/// Replace every non-finite channel with zero.
#[inline]
pub fn zero_non_finite(color: Color) -> Color {
    let fix = |c: f32| if c.is_finite() { c } else { 0.0 };
    Color::new(fix(color.x), fix(color.y), fix(color.z))
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a summed pixel color to 8-bit RGB.
///
/// Divides by the sample count, zeroes NaN and infinite channels, applies
/// gamma 2 and quantizes `[0, 0.999]` to `0..=255`.
pub fn color_to_rgb(sum: Color, samples_per_pixel: u32) -> [u8; 3] {
    let scale = 1.0 / samples_per_pixel.max(1) as f32;
    let color = zero_non_finite(sum * scale);

    let quantize = |c: f32| (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Sum of `config.samples_per_pixel` radiance samples for pixel (x, y).
///
/// `y` counts rows from the top of the image.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let i = x as f32;
    let j = config.image_height.saturating_sub(1 + y) as f32;
    let w = config.image_width.saturating_sub(1).max(1) as f32;
    let h = config.image_height.saturating_sub(1).max(1) as f32;

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let s = (i + gen_f32(rng)) / w;
        let t = (j + gen_f32(rng)) / h;
        let ray = camera.get_ray(s, t, rng);
        let sample = ray_color(
            &ray,
            scene.world.as_ref(),
            &scene.lights,
            config.max_depth,
            config,
            rng,
        );
        pixel_color += zero_non_finite(sample);
    }

    pixel_color
}

/// Errors raised while writing a finished image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("pixel buffer does not match a {0}x{1} image")]
    BufferSize(u32, u32),
}

/// Per-pixel accumulator of summed radiance samples.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    /// Samples summed into every pixel
    pub samples_per_pixel: u32,
    /// Row-major sums, row 0 at the top
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32, samples_per_pixel: u32) -> Self {
        Self {
            width,
            height,
            samples_per_pixel,
            pixels: vec![Color::ZERO; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel sum at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel sum at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Average color at (x, y), before gamma.
    pub fn average(&self, x: u32, y: u32) -> Color {
        self.get(x, y) / self.samples_per_pixel.max(1) as f32
    }

    /// Encoded RGB bytes, row-major from the top.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb(*color, self.samples_per_pixel));
        }
        bytes
    }

    /// Write as ASCII PPM (`P3`).
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;
        for color in &self.pixels {
            let [r, g, b] = color_to_rgb(*color, self.samples_per_pixel);
            writeln!(out, "{} {} {}", r, g, b)?;
        }
        Ok(())
    }

    /// Save to `path`. `.ppm` is written as ASCII PPM, every other extension
    /// goes through the `image` crate.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), OutputError> {
        let path = path.as_ref();
        let is_ppm = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

        if is_ppm {
            let mut out = BufWriter::new(File::create(path)?);
            self.write_ppm(&mut out)?;
            out.flush()?;
        } else {
            let img = image::RgbImage::from_raw(self.width, self.height, self.to_rgb8())
                .ok_or(OutputError::BufferSize(self.width, self.height))?;
            img.save(path)?;
        }

        log::info!("Wrote {}", path.display());
        Ok(())
    }
}

/// Render the entire scene to an image buffer.
///
/// Single-threaded reference path: one generator for the whole image.
pub fn render(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> ImageBuffer {
    let start = Instant::now();
    let mut image = ImageBuffer::new(
        config.image_width,
        config.image_height,
        config.samples_per_pixel,
    );

    for y in 0..config.image_height {
        for x in 0..config.image_width {
            let color = render_pixel(camera, scene, x, y, config, rng);
            image.set(x, y, color);
        }
    }

    log::info!(
        "Rendered {}x{} at {} spp in {:.2?}",
        config.image_width,
        config.image_height,
        config.samples_per_pixel,
        start.elapsed()
    );

    image
}
