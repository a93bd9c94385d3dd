//! Render settings loaded from JSON.
//!
//! Every field is optional in the file; missing fields take the defaults
//! below. The scene builder supplies its own camera and background. A
//! settings file may override the background, and any subset of the
//! camera fields; the rest keep the scene's values.

use std::path::Path;

use ember_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Placement and lens of the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Image width / height
    pub aspect_ratio: f32,
    /// Lens diameter; 0 disables depth of field
    pub aperture: f32,
    /// Distance from the camera to the plane of perfect focus
    pub focus_dist: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 40.0,
            aspect_ratio: 1.0,
            aperture: 0.0,
            focus_dist: 10.0,
        }
    }
}

impl CameraSettings {
    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Reject a degenerate frustum.
    pub fn validate(&self) -> SettingsResult<()> {
        if !(self.aspect_ratio > 0.0) {
            return Err(SettingsError::Invalid("aspect_ratio must be > 0".into()));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(SettingsError::Invalid("vfov must be in (0, 180)".into()));
        }
        Ok(())
    }
}

/// Camera fields given in a settings file. Unset fields keep the scene's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOverride {
    pub look_from: Option<Vec3>,
    pub look_at: Option<Vec3>,
    pub vup: Option<Vec3>,
    pub vfov: Option<f32>,
    pub aspect_ratio: Option<f32>,
    pub aperture: Option<f32>,
    pub focus_dist: Option<f32>,
}

impl CameraOverride {
    /// Layer the given fields over `base`.
    pub fn apply(&self, base: CameraSettings) -> CameraSettings {
        CameraSettings {
            look_from: self.look_from.unwrap_or(base.look_from),
            look_at: self.look_at.unwrap_or(base.look_at),
            vup: self.vup.unwrap_or(base.vup),
            vfov: self.vfov.unwrap_or(base.vfov),
            aspect_ratio: self.aspect_ratio.unwrap_or(base.aspect_ratio),
            aperture: self.aperture.unwrap_or(base.aperture),
            focus_dist: self.focus_dist.unwrap_or(base.focus_dist),
        }
    }
}

/// Image and sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub image_width: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub seed: u64,
    pub bucket_size: u32,
    /// Overrides the scene's background color
    pub background: Option<Vec3>,
    /// Overrides individual fields of the scene's camera
    pub camera: CameraOverride,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            image_width: 500,
            samples_per_pixel: 100,
            max_depth: 50,
            seed: 0,
            bucket_size: 64,
            background: None,
            camera: CameraOverride::default(),
        }
    }
}

impl RenderSettings {
    /// Parse settings from a JSON string.
    pub fn from_json_str(json: &str) -> SettingsResult<Self> {
        let settings: RenderSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::debug!("Loaded render settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values that would produce an empty image or a division by zero.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.image_width == 0 {
            return Err(SettingsError::Invalid("image_width must be > 0".into()));
        }
        if self.samples_per_pixel == 0 {
            return Err(SettingsError::Invalid("samples_per_pixel must be > 0".into()));
        }
        if self.bucket_size == 0 {
            return Err(SettingsError::Invalid("bucket_size must be > 0".into()));
        }
        // Only the overridden fields are known here
        self.camera.apply(CameraSettings::default()).validate()
    }

    /// The scene's camera with this file's overrides applied.
    pub fn camera_for(&self, scene_camera: CameraSettings) -> SettingsResult<CameraSettings> {
        let camera = self.camera.apply(scene_camera);
        camera.validate()?;
        Ok(camera)
    }

    /// Image height for a given aspect ratio (at least one row).
    pub fn image_height(&self, aspect_ratio: f32) -> u32 {
        ((self.image_width as f32 / aspect_ratio) as u32).max(1)
    }
}
