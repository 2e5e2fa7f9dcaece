use thiserror::Error;

use crate::gallery::GalleryId;

/// Errors from changing capture settings or loading stroke data.
/// Whatever was being changed is left untouched.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Invalid stroke color {input:?}: {reason}")]
    InvalidColor { input: String, reason: String },

    #[error("Stroke width must be a positive number, got {0}")]
    InvalidWidth(f32),

    #[error("A stroke needs at least one point")]
    EmptyStroke,

    #[error("Drawing duration must be a non-negative number, got {0}")]
    InvalidDuration(f64),
}

/// Errors that can occur while preparing or exporting a drawing surface
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} drawing surface")]
    SurfaceUnavailable { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Failures reported by a gallery store
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("No gallery item with id {0}")]
    NotFound(GalleryId),

    #[error("Gallery rejected the request: {0}")]
    Rejected(String),

    #[error("Gallery is unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur when submitting the current drawing
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Nothing to submit: the drawing has no strokes")]
    EmptyDrawing,

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Gallery(#[from] GalleryError),
}

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config data: {0}")]
    Parse(#[from] serde_json::Error),
}
