use crate::error::SubmitError;
use crate::gallery::{GalleryId, GalleryStore, Submission};
use crate::renderer::StrokeRenderer;
use crate::session::DrawingSession;
use crate::surface::Surface;

/// Surface scale for submitted images: one device pixel per canvas pixel.
const SUBMIT_PIXELS_PER_POINT: f32 = 1.0;

/// Render the session's drawing, hand it to `store` and start a new drawing.
///
/// The session is only cleared once the store accepts the drawing. Failures
/// leave it as it was so the user can try again; nothing is retried here.
pub async fn submit_drawing<S: GalleryStore>(
    session: &mut DrawingSession,
    renderer: &StrokeRenderer,
    store: &S,
    now: f64,
) -> Result<GalleryId, SubmitError> {
    if !session.has_strokes() {
        return Err(SubmitError::EmptyDrawing);
    }

    let mut surface = Surface::new(session.canvas_size(), SUBMIT_PIXELS_PER_POINT)?;
    renderer.render(&session.scene(), &mut surface);
    let submission = Submission {
        image_png: surface.encode_png()?,
        document: session.drawing_document(now),
        score: session.score(),
    };
    let stroke_count = submission.document.strokes.len();

    match store.submit(submission).await {
        Ok(id) => {
            log::info!("Submitted drawing {id} with {stroke_count} strokes");
            session.clear();
            Ok(id)
        }
        Err(err) => {
            log::warn!("Submitting drawing failed: {err}");
            Err(err.into())
        }
    }
}
