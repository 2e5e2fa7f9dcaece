//! Capture state of a drawing session.
//!
//! ```text
//!            pointer down
//!   ┌──────┐ ───────────► ┌───────────┐
//!   │ Idle │              │ Capturing │ ◄─┐ pointer move
//!   └──────┘ ◄─────────── └───────────┘ ──┘
//!        pointer up / leave / clear
//! ```
//!
//! The in-progress stroke only exists while capturing.

use crate::stroke::Stroke;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing {
        stroke: Stroke,
    },
}

impl CaptureState {
    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing { .. })
    }

    pub fn in_progress(&self) -> Option<&Stroke> {
        match self {
            Self::Capturing { stroke } => Some(stroke),
            Self::Idle => None,
        }
    }

    pub fn in_progress_mut(&mut self) -> Option<&mut Stroke> {
        match self {
            Self::Capturing { stroke } => Some(stroke),
            Self::Idle => None,
        }
    }

    /// Return to idle, handing back the stroke that was in progress.
    pub fn finish(&mut self) -> Option<Stroke> {
        match std::mem::take(self) {
            Self::Capturing { stroke } => Some(stroke),
            Self::Idle => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Capturing { .. } => "Capturing",
        }
    }
}
