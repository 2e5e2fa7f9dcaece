use egui::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::CaptureError;
use crate::stroke::Stroke;

/// Canvas size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(400.0, 240.0)
    }
}

/// Snapshot of a drawing, handed to the gallery store on submit.
///
/// Field names follow the interchange payload (`strokes`, `dimensions`,
/// `duration`). Stroke `timestamp`s are seconds on the session clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct DrawingDocument {
    pub strokes: Vec<Stroke>,
    #[serde(rename = "dimensions")]
    pub canvas_size: CanvasSize,
    #[serde(rename = "duration")]
    pub total_duration_seconds: f64,
}

#[derive(Deserialize)]
struct RawDocument {
    strokes: Vec<Stroke>,
    dimensions: CanvasSize,
    #[serde(default)]
    duration: f64,
}

impl TryFrom<RawDocument> for DrawingDocument {
    type Error = CaptureError;

    fn try_from(raw: RawDocument) -> Result<Self, Self::Error> {
        let document = Self {
            strokes: raw.strokes,
            canvas_size: raw.dimensions,
            total_duration_seconds: raw.duration,
        };
        document.validate()?;
        Ok(document)
    }
}

impl DrawingDocument {
    pub fn new(canvas_size: CanvasSize) -> Self {
        Self {
            strokes: Vec::new(),
            canvas_size,
            total_duration_seconds: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|stroke| stroke.points().len()).sum()
    }

    /// Every stroke must be valid and the duration a non-negative number.
    pub fn validate(&self) -> Result<(), CaptureError> {
        let duration = self.total_duration_seconds;
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(CaptureError::InvalidDuration(duration));
        }
        self.strokes.iter().try_for_each(Stroke::validate)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
