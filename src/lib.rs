#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod document;
pub mod error;
pub mod gallery;
pub mod input;
pub mod layout;
pub mod panels;
pub mod renderer;
pub mod scoring;
pub mod session;
pub mod state;
pub mod stroke;
pub mod submit;
pub mod surface;
pub mod util;

pub use app::DoodleApp;
pub use config::Config;
pub use document::{CanvasSize, DrawingDocument};
pub use error::{CaptureError, ConfigError, GalleryError, RenderError, SubmitError};
pub use gallery::{GalleryId, GalleryItem, GalleryStore, MemoryGallery};
pub use input::{InputEvent, InputHandler, PointerDevice, PointerSample};
pub use layout::{FloatPosition, FloatingLayout};
pub use renderer::{Scene, StrokeRenderer};
pub use scoring::{RandomScorer, ScoreReport, Scorer};
pub use session::DrawingSession;
pub use state::CaptureState;
pub use stroke::{BrushSettings, Point, Stroke, StrokeColor, Tool};
pub use submit::submit_drawing;
pub use surface::Surface;
