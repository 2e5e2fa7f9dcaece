use tiny_skia::{BlendMode, Color, LineCap, LineJoin, Paint, PathBuilder, Transform};

use crate::stroke::{Point, Stroke, Tool};
use crate::surface::Surface;

/// Match-confidence tint drawn behind the strokes.
const TINT_RGB: [u8; 3] = [34, 197, 94];
const TINT_MAX_OPACITY: f32 = 0.3;

/// Everything that ends up on the canvas.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scene<'a> {
    pub committed: &'a [Stroke],
    pub in_progress: Option<&'a Stroke>,
    pub background_score: Option<f32>,
}

impl<'a> Scene<'a> {
    pub fn new(committed: &'a [Stroke]) -> Self {
        Self {
            committed,
            in_progress: None,
            background_score: None,
        }
    }

    /// Strokes in paint order: commit order, then the one in progress.
    pub fn strokes(self) -> impl Iterator<Item = &'a Stroke> {
        self.committed.iter().chain(self.in_progress)
    }
}

/// Repaints a [`Scene`] onto a [`Surface`] from scratch.
///
/// The renderer holds no drawing state, so it is safe to call after every
/// mutation of the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrokeRenderer;

impl StrokeRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, scene: &Scene<'_>, surface: &mut Surface) {
        let transform = Transform::from_scale(surface.pixels_per_point(), surface.pixels_per_point());
        let pixmap = surface.pixmap_mut();

        pixmap.fill(Color::TRANSPARENT);
        if let Some(score) = scene.background_score {
            pixmap.fill(tint_color(score));
        }

        for stroke in scene.strokes() {
            let Some(path) = stroke_path(stroke.points()) else {
                continue;
            };
            let paint = stroke_paint(stroke);
            let outline = tiny_skia::Stroke {
                width: stroke.width(),
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &outline, transform, None);
        }
    }
}

fn tint_color(score: f32) -> Color {
    let opacity = (score.max(0.0) * TINT_MAX_OPACITY).min(TINT_MAX_OPACITY);
    let [r, g, b] = TINT_RGB;
    Color::from_rgba8(r, g, b, (opacity * 255.0).round() as u8)
}

fn stroke_paint(stroke: &Stroke) -> Paint<'static> {
    let mut paint = Paint {
        anti_alias: true,
        ..Default::default()
    };
    match stroke.tool() {
        Tool::Pen => {
            let [r, g, b, a] = stroke.color().to_rgba_unmultiplied();
            paint.set_color_rgba8(r, g, b, a);
            paint.blend_mode = BlendMode::SourceOver;
        }
        Tool::Eraser => {
            paint.set_color_rgba8(0, 0, 0, 255);
            paint.blend_mode = BlendMode::DestinationOut;
        }
    }
    paint
}

/// Smoothed outline through the points: quadratic segments through midpoints
/// with each interior point as the control, closed off with a straight segment
/// into the last point.
fn stroke_path(points: &[Point]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let last = rest.last()?;

    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    for pair in points[1..].windows(2) {
        let (control, next) = (pair[0], pair[1]);
        builder.quad_to(
            control.x,
            control.y,
            (control.x + next.x) / 2.0,
            (control.y + next.y) / 2.0,
        );
    }
    builder.line_to(last.x, last.y);
    builder.finish()
}
