//! The drawing session: capture state machine plus the stroke model it owns.
//!
//! A session is created when the drawing view opens and reset on clear or a
//! successful submit. All calls are synchronous and happen on the UI thread.

use egui::Rect;

use crate::config::{CaptureConfig, Config};
use crate::document::{CanvasSize, DrawingDocument};
use crate::error::CaptureError;
use crate::input::{CanvasMapping, InputEvent, PointerDevice, PointerSample};
use crate::renderer::Scene;
use crate::scoring::ScoreReport;
use crate::state::CaptureState;
use crate::stroke::{BrushSettings, Point, Stroke, StrokeColor, Tool, validate_width};
use crate::util::time;

#[derive(Debug, Clone)]
pub struct DrawingSession {
    state: CaptureState,
    strokes: Vec<Stroke>,
    brush: BrushSettings,
    mapping: CanvasMapping,
    config: CaptureConfig,
    /// Clock reading at the first pointer-down of the session
    started_at: Option<f64>,
    score: Option<ScoreReport>,
    last_touch_time: Option<f64>,
}

impl DrawingSession {
    /// A brush loaded from config or persisted state that fails validation is
    /// replaced by the default brush.
    pub fn new(canvas_size: CanvasSize, brush: BrushSettings, config: CaptureConfig) -> Self {
        let brush = match brush.validate() {
            Ok(()) => brush,
            Err(err) => {
                log::warn!("Ignoring brush settings: {err}");
                BrushSettings::default()
            }
        };
        Self {
            state: CaptureState::Idle,
            strokes: Vec::new(),
            brush,
            mapping: CanvasMapping::identity(canvas_size),
            config,
            started_at: None,
            score: None,
            last_touch_time: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.canvas.size,
            config.canvas.brush,
            config.capture.clone(),
        )
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Committed strokes in commit order.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn in_progress(&self) -> Option<&Stroke> {
        self.state.in_progress()
    }

    pub fn has_strokes(&self) -> bool {
        !self.strokes.is_empty()
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.mapping.canvas_size
    }

    pub fn mapping(&self) -> &CanvasMapping {
        &self.mapping
    }

    pub fn score(&self) -> Option<ScoreReport> {
        self.score
    }

    // Settings apply to the next stroke only.

    pub fn set_tool(&mut self, tool: Tool) {
        self.brush.tool = tool;
    }

    pub fn set_color(&mut self, color: &str) -> Result<(), CaptureError> {
        self.brush.color = StrokeColor::parse(color)?;
        Ok(())
    }

    pub fn set_stroke_color(&mut self, color: StrokeColor) {
        self.brush.color = color;
    }

    pub fn set_width(&mut self, width: f32) -> Result<(), CaptureError> {
        validate_width(width)?;
        self.brush.width = width;
        Ok(())
    }

    /// Update where the canvas currently sits on screen.
    pub fn set_canvas_rect(&mut self, screen_rect: Rect) {
        self.mapping.screen_rect = screen_rect;
    }

    pub fn set_score(&mut self, score: Option<ScoreReport>) {
        self.score = score;
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown(sample) => {
                self.pointer_down(sample);
            }
            InputEvent::PointerMove(sample) => {
                self.pointer_move(sample);
            }
            InputEvent::PointerUp { device, time } => {
                self.pointer_up(*device, *time);
            }
            InputEvent::PointerLeave { time } => {
                self.pointer_leave(*time);
            }
        }
    }

    /// Begin a stroke. Returns whether the event was accepted.
    pub fn pointer_down(&mut self, sample: &PointerSample) -> bool {
        if !self.accept_touch(sample, true) {
            return false;
        }
        if self.state.is_capturing() {
            log::debug!("Ignoring pointer down while a stroke is in progress");
            return false;
        }

        self.started_at.get_or_insert(sample.time);
        let point = self.map_point(sample);
        self.state = CaptureState::Capturing {
            stroke: Stroke::begin(point, &self.brush, sample.time),
        };
        log::trace!("Stroke started at ({:.1}, {:.1})", point.x, point.y);
        true
    }

    /// Append a point to the stroke in progress. Returns whether it was accepted.
    pub fn pointer_move(&mut self, sample: &PointerSample) -> bool {
        if !self.accept_touch(sample, false) {
            return false;
        }
        let point = self.map_point(sample);
        match self.state.in_progress_mut() {
            Some(stroke) => {
                stroke.push_point(point);
                true
            }
            None => false,
        }
    }

    /// Commit the stroke in progress, if any.
    pub fn pointer_up(&mut self, device: PointerDevice, time: f64) -> bool {
        if device.is_touch() {
            self.last_touch_time = Some(time);
        }
        self.commit()
    }

    /// The pointer left the capture surface or the gesture was cancelled.
    pub fn pointer_leave(&mut self, _time: f64) -> bool {
        self.commit()
    }

    fn commit(&mut self) -> bool {
        match self.state.finish() {
            Some(stroke) => {
                log::debug!(
                    "Committed {} stroke with {} points",
                    stroke.tool().label(),
                    stroke.points().len()
                );
                self.strokes.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Drop every stroke, the duration timer and the score.
    pub fn clear(&mut self) {
        self.state = CaptureState::Idle;
        self.strokes.clear();
        self.started_at = None;
        self.score = None;
        self.last_touch_time = None;
    }

    /// Remove the most recently committed stroke. Ignored mid-stroke.
    pub fn undo(&mut self) -> Option<Stroke> {
        if self.state.is_capturing() {
            log::debug!("Ignoring undo while a stroke is in progress");
            return None;
        }
        self.strokes.pop()
    }

    pub fn duration_secs(&self, now: f64) -> f64 {
        self.started_at
            .map(|start| time::elapsed_secs(start, now))
            .unwrap_or(0.0)
    }

    /// Snapshot of the drawing, including the stroke in progress.
    pub fn drawing_document(&self, now: f64) -> DrawingDocument {
        let mut strokes = self.strokes.clone();
        strokes.extend(self.state.in_progress().cloned());
        DrawingDocument {
            strokes,
            canvas_size: self.canvas_size(),
            total_duration_seconds: self.duration_secs(now),
        }
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            committed: &self.strokes,
            in_progress: self.state.in_progress(),
            background_score: self.score.map(|report| report.score),
        }
    }

    /// Replace the session contents with a stored drawing.
    pub fn load_document(&mut self, document: DrawingDocument, now: f64) -> Result<(), CaptureError> {
        document.validate()?;
        self.clear();
        self.mapping.canvas_size = document.canvas_size;
        self.strokes = document.strokes;
        if document.total_duration_seconds > 0.0 || !self.strokes.is_empty() {
            self.started_at = Some(now - document.total_duration_seconds);
        }
        Ok(())
    }

    fn map_point(&self, sample: &PointerSample) -> Point {
        let pos = self.mapping.to_canvas(sample.position);
        Point::new(pos.x, pos.y, sample.pressure)
    }

    /// Filter touch samples before they reach the state machine.
    fn accept_touch(&mut self, sample: &PointerSample, is_down: bool) -> bool {
        let PointerDevice::Touch { radius, contacts } = sample.device else {
            return true;
        };

        let previous = self.last_touch_time.replace(sample.time);
        if let Some(previous) = previous.filter(|_| is_down) {
            let elapsed_ms = (sample.time - previous) * 1000.0;
            if (0.0..self.config.duplicate_window_ms).contains(&elapsed_ms) {
                log::trace!("Rejected duplicate touch {elapsed_ms:.2}ms after the last one");
                return false;
            }
        }
        if radius.is_some_and(|radius| radius > self.config.palm_radius) {
            log::trace!("Rejected palm contact with radius {radius:?}");
            return false;
        }
        if contacts > 1 {
            log::trace!("Ignoring multi-touch event with {contacts} contacts");
            return false;
        }
        true
    }
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Pos2;

    fn mouse(x: f32, y: f32, time: f64) -> PointerSample {
        PointerSample::mouse(Pos2::new(x, y), time)
    }

    fn draw(session: &mut DrawingSession, points: &[(f32, f32)], start: f64) {
        let (x, y) = points[0];
        assert!(session.pointer_down(&mouse(x, y, start)));
        for (i, (x, y)) in points[1..].iter().enumerate() {
            session.pointer_move(&mouse(*x, *y, start + 0.016 * (i + 1) as f64));
        }
        session.pointer_up(PointerDevice::Mouse, start + 1.0);
    }

    #[test]
    fn test_move_while_idle_is_ignored() {
        let mut session = DrawingSession::default();
        assert!(!session.pointer_move(&mouse(1.0, 1.0, 0.0)));
        assert!(session.strokes().is_empty());
        assert!(!session.state().is_capturing());
    }

    #[test]
    fn test_up_commits_and_returns_to_idle() {
        let mut session = DrawingSession::default();
        draw(&mut session, &[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)], 0.0);
        assert_eq!(session.strokes().len(), 1);
        assert_eq!(session.strokes()[0].points().len(), 3);
        assert!(session.in_progress().is_none());
    }

    #[test]
    fn test_leave_commits_like_up() {
        let mut session = DrawingSession::default();
        session.pointer_down(&mouse(1.0, 1.0, 0.0));
        session.pointer_move(&mouse(2.0, 2.0, 0.1));
        assert!(session.pointer_leave(0.2));
        assert_eq!(session.strokes().len(), 1);
        assert!(!session.state().is_capturing());
    }

    #[test]
    fn test_second_down_while_capturing_is_ignored() {
        let mut session = DrawingSession::default();
        assert!(session.pointer_down(&mouse(1.0, 1.0, 0.0)));
        assert!(!session.pointer_down(&mouse(5.0, 5.0, 0.1)));
        session.pointer_up(PointerDevice::Mouse, 0.2);
        assert_eq!(session.strokes().len(), 1);
        assert_eq!(session.strokes()[0].points()[0].x, 1.0);
    }

    #[test]
    fn test_settings_do_not_change_stroke_in_progress() {
        let mut session = DrawingSession::default();
        session.pointer_down(&mouse(1.0, 1.0, 0.0));
        session.set_tool(Tool::Eraser);
        session.set_color("red").unwrap();
        session.set_width(20.0).unwrap();
        session.pointer_move(&mouse(2.0, 2.0, 0.1));
        session.pointer_up(PointerDevice::Mouse, 0.2);

        let stroke = &session.strokes()[0];
        assert_eq!(stroke.tool(), Tool::Pen);
        assert_eq!(stroke.color(), StrokeColor::BLACK);
        assert_eq!(stroke.width(), 3.0);
        assert_eq!(session.brush().tool, Tool::Eraser);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut session = DrawingSession::default();
        assert!(session.set_width(0.0).is_err());
        assert!(session.set_width(-2.0).is_err());
        assert!(session.set_width(f32::NAN).is_err());
        assert!(session.set_color("chartreuse-ish").is_err());
        assert_eq!(*session.brush(), BrushSettings::default());
    }

    #[test]
    fn test_undo_is_ignored_mid_stroke() {
        let mut session = DrawingSession::default();
        draw(&mut session, &[(1.0, 1.0), (2.0, 2.0)], 0.0);
        session.pointer_down(&mouse(5.0, 5.0, 2.0));
        assert!(session.undo().is_none());
        assert_eq!(session.strokes().len(), 1);
    }

    #[test]
    fn test_duration_starts_at_first_down() {
        let mut session = DrawingSession::default();
        assert_eq!(session.duration_secs(100.0), 0.0);
        draw(&mut session, &[(1.0, 1.0), (2.0, 2.0)], 10.0);
        draw(&mut session, &[(1.0, 1.0), (2.0, 2.0)], 20.0);
        assert_eq!(session.duration_secs(25.0), 15.0);
        assert_eq!(session.drawing_document(25.0).total_duration_seconds, 15.0);
    }

    #[test]
    fn test_document_includes_stroke_in_progress() {
        let mut session = DrawingSession::default();
        draw(&mut session, &[(1.0, 1.0), (2.0, 2.0)], 0.0);
        session.pointer_down(&mouse(5.0, 5.0, 2.0));
        let doc = session.drawing_document(3.0);
        assert_eq!(doc.strokes.len(), 2);
        assert_eq!(session.scene().committed.len(), 1);
        assert!(session.scene().in_progress.is_some());
    }

    #[test]
    fn test_clear_resets_score_and_state() {
        let mut session = DrawingSession::default();
        session.set_score(Some(ScoreReport {
            score: 0.5,
            confidence: 0.9,
        }));
        session.pointer_down(&mouse(1.0, 1.0, 0.0));
        session.clear();
        assert!(session.score().is_none());
        assert!(!session.state().is_capturing());
        assert!(session.scene().background_score.is_none());
    }

    #[test]
    fn test_touch_duplicate_down_is_rejected() {
        let mut session = DrawingSession::default();
        let first = PointerSample::touch(Pos2::new(1.0, 1.0), 1.000);
        assert!(session.pointer_down(&first));
        session.pointer_up(first.device, 1.002);

        let duplicate = PointerSample::touch(Pos2::new(1.0, 1.0), 1.005);
        assert!(!session.pointer_down(&duplicate));

        let later = PointerSample::touch(Pos2::new(1.0, 1.0), 1.100);
        assert!(session.pointer_down(&later));
    }

    #[test]
    fn test_palm_contact_is_rejected() {
        let mut session = DrawingSession::default();
        let palm = PointerSample::touch(Pos2::new(1.0, 1.0), 1.0).with_radius(35.0);
        assert!(!session.pointer_down(&palm));
        assert!(!session.state().is_capturing());

        let finger = PointerSample::touch(Pos2::new(1.0, 1.0), 2.0).with_radius(8.0);
        assert!(session.pointer_down(&finger));
    }

    #[test]
    fn test_multi_touch_moves_are_ignored() {
        let mut session = DrawingSession::default();
        session.pointer_down(&PointerSample::touch(Pos2::new(1.0, 1.0), 1.0));
        let pinch = PointerSample::touch(Pos2::new(3.0, 3.0), 1.1).with_contacts(2);
        assert!(!session.pointer_move(&pinch));
        let single = PointerSample::touch(Pos2::new(4.0, 4.0), 1.2);
        assert!(session.pointer_move(&single));
        assert_eq!(session.in_progress().map(|s| s.points().len()), Some(2));
    }

    #[test]
    fn test_palm_thresholds_are_configurable() {
        let config = CaptureConfig {
            palm_radius: 50.0,
            duplicate_window_ms: 0.0,
        };
        let mut session = DrawingSession::new(CanvasSize::default(), BrushSettings::default(), config);
        let wide = PointerSample::touch(Pos2::new(1.0, 1.0), 1.0).with_radius(35.0);
        assert!(session.pointer_down(&wide));
    }

    #[test]
    fn test_load_document_restores_duration() {
        let mut source = DrawingSession::default();
        draw(&mut source, &[(1.0, 1.0), (2.0, 2.0)], 0.0);
        let doc = source.drawing_document(30.0);

        let mut session = DrawingSession::default();
        session.load_document(doc.clone(), 100.0).unwrap();
        assert_eq!(session.strokes(), doc.strokes.as_slice());
        assert_eq!(session.duration_secs(100.0), 30.0);
        assert_eq!(session.duration_secs(105.0), 35.0);
    }

    #[test]
    fn test_load_document_rejects_invalid_document() {
        let mut session = DrawingSession::default();
        draw(&mut session, &[(1.0, 1.0), (2.0, 2.0)], 0.0);

        let mut doc = DrawingDocument::new(CanvasSize::default());
        doc.total_duration_seconds = -3.0;
        assert!(matches!(
            session.load_document(doc, 10.0),
            Err(CaptureError::InvalidDuration(_))
        ));
        assert_eq!(session.strokes().len(), 1);

        let bad_brush = BrushSettings {
            width: -4.0,
            ..BrushSettings::default()
        };
        let mut doc = DrawingDocument::new(CanvasSize::default());
        doc.strokes.push(Stroke::begin(Point::new(0.0, 0.0, None), &bad_brush, 0.0));
        assert!(matches!(
            session.load_document(doc, 10.0),
            Err(CaptureError::InvalidWidth(_))
        ));
        assert_eq!(session.strokes().len(), 1);
    }

    #[test]
    fn test_invalid_configured_brush_falls_back_to_default() {
        let config = Config::from_json_str(r#"{"canvas":{"brush":{"width":-5.0}}}"#).unwrap();
        let mut session = DrawingSession::from_config(&config);
        assert_eq!(session.brush().width, BrushSettings::default().width);

        draw(&mut session, &[(1.0, 1.0), (2.0, 2.0)], 0.0);
        assert_eq!(session.strokes()[0].width(), 3.0);
    }
}
