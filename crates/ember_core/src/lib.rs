//! Ember Core - textures and render settings shared by the renderer and CLI.
//!
//! This crate provides:
//!
//! - **Textures**: `SolidColor`, `CheckerTexture`, `ImageTexture`
//! - **Settings**: `RenderSettings` / `CameraSettings`, loadable from JSON
//!
//! # Example
//!
//! ```ignore
//! use ember_core::{ImageTexture, RenderSettings};
//!
//! let settings = RenderSettings::load("render.json")?;
//! let earth = ImageTexture::open_or_debug("earthmap.jpg");
//! ```

pub mod settings;
pub mod texture;

// Re-export commonly used types
pub use settings::{
    CameraOverride, CameraSettings, RenderSettings, SettingsError, SettingsResult,
};
pub use texture::{
    CheckerTexture, Color, ImageTexture, SolidColor, Texture, TextureError, TextureResult,
    DEBUG_CYAN,
};
