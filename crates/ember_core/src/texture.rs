//! Textures sampled by materials.
//!
//! A texture maps surface coordinates `(u, v)` and the hit point to a color.
//! Image textures decode their pixels once at scene-build time and are
//! read-only afterwards, so every texture can be shared between render
//! threads behind an `Arc`.

use std::path::Path;
use std::sync::Arc;

use ember_math::Vec3;
use thiserror::Error;

/// Color type alias (linear RGB, usually 0-1 but emitters may exceed 1)
pub type Color = Vec3;

/// Color returned by an image texture that failed to load.
pub const DEBUG_CYAN: Color = Color::new(0.0, 1.0, 1.0);

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Anything that can be evaluated at a surface point.
pub trait Texture: Send + Sync {
    /// Color at texture coordinates `(u, v)` and world-space point `p`.
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// A single constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(Color::new(r, g, b))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.color
    }
}

impl From<Color> for SolidColor {
    fn from(color: Color) -> Self {
        Self::new(color)
    }
}

/// Solid 3D checker pattern alternating between two textures.
pub struct CheckerTexture {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
    /// Spatial frequency of the pattern
    scale: f32,
}

impl CheckerTexture {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>, scale: f32) -> Self {
        Self { even, odd, scale }
    }

    /// Checker between two solid colors.
    pub fn from_colors(even: Color, odd: Color, scale: f32) -> Self {
        Self::new(
            Arc::new(SolidColor::new(even)),
            Arc::new(SolidColor::new(odd)),
            scale,
        )
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let s = self.scale;
        let sines = (s * p.x).sin() * (s * p.y).sin() * (s * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Texture backed by 8-bit RGB pixel data.
///
/// An image that failed to decode is kept as an empty texture
/// (`width == height == 0`) which evaluates to [`DEBUG_CYAN`] everywhere, so
/// a missing file is visible in the render instead of aborting it.
#[derive(Clone, Debug, Default)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    /// Row-major RGB bytes, top row first
    data: Vec<u8>,
}

const BYTES_PER_PIXEL: usize = 3;

impl ImageTexture {
    /// Wrap already decoded RGB bytes.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> TextureResult<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(TextureError::LoadError(format!(
                "expected {} bytes for {}x{} RGB image, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode an image file with the `image` crate.
    pub fn open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        log::debug!("Loaded texture: {} ({}x{})", path.display(), width, height);

        Self::from_rgb8(width, height, rgb.into_raw())
    }

    /// Decode an image file, falling back to the cyan debug texture.
    pub fn open_or_debug(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{}: {}; using debug color", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when there is no pixel data to sample.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        if self.is_empty() {
            return DEBUG_CYAN;
        }

        // Clamp to [0,1] and flip v into image row order
        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0);

        let i = ((u * self.width as f32) as u32).min(self.width - 1) as usize;
        let j = ((v * self.height as f32) as u32).min(self.height - 1) as usize;

        let idx = (j * self.width as usize + i) * BYTES_PER_PIXEL;
        let pixel = &self.data[idx..idx + BYTES_PER_PIXEL];

        let color_scale = 1.0 / 255.0;
        Color::new(
            pixel[0] as f32 * color_scale,
            pixel[1] as f32 * color_scale,
            pixel[2] as f32 * color_scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color_texture() {
        let tex = SolidColor::rgb(1.0, 0.5, 0.0);
        let sample = tex.value(0.3, 0.7, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(sample, Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_alternates() {
        let tex = CheckerTexture::from_colors(Color::ONE, Color::ZERO, 10.0);

        // All three sines positive -> even
        let p_even = Vec3::splat(0.1);
        assert_eq!(tex.value(0.0, 0.0, p_even), Color::ONE);

        // Flip the sign of one factor -> odd
        let p_odd = Vec3::new(-0.1, 0.1, 0.1);
        assert_eq!(tex.value(0.0, 0.0, p_odd), Color::ZERO);
    }

    #[test]
    fn test_image_texture_lookup() {
        // 2x1 image: left red, right blue
        let data = vec![255, 0, 0, 0, 0, 255];
        let tex = ImageTexture::from_rgb8(2, 1, data).unwrap();

        assert_eq!(tex.value(0.1, 0.5, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(0.9, 0.5, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));

        // Out-of-range coordinates are clamped onto the border pixels
        assert_eq!(tex.value(1.5, -3.0, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));
        assert_eq!(tex.value(-1.0, 2.0, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_image_texture_flips_v() {
        // 1x2 image: top row white, bottom row black
        let data = vec![255, 255, 255, 0, 0, 0];
        let tex = ImageTexture::from_rgb8(1, 2, data).unwrap();

        assert_eq!(tex.value(0.5, 0.9, Vec3::ZERO), Color::ONE);
        assert_eq!(tex.value(0.5, 0.1, Vec3::ZERO), Color::ZERO);
    }

    #[test]
    fn test_image_texture_rejects_short_buffer() {
        let result = ImageTexture::from_rgb8(4, 4, vec![0; 10]);
        assert!(matches!(result, Err(TextureError::LoadError(_))));
    }

    #[test]
    fn test_missing_image_falls_back_to_cyan() {
        let _ = env_logger::builder().is_test(true).try_init();

        let result = ImageTexture::open("definitely/not/here.jpg");
        assert!(matches!(result, Err(TextureError::ImageError(_))));

        let tex = ImageTexture::open_or_debug("definitely/not/here.jpg");
        assert_eq!(tex.width(), 0);
        assert_eq!(tex.height(), 0);
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), DEBUG_CYAN);
    }
}
