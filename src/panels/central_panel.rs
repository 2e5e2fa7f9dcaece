use egui::{Color32, Rect, Sense, Stroke, pos2};

use crate::app::DoodleApp;

const MIN_CANVAS_SCALE: f32 = 0.25;
const MAX_CANVAS_SCALE: f32 = 4.0;

pub fn central_panel(app: &mut DoodleApp, ctx: &egui::Context, now: f64) {
    egui::CentralPanel::default().show(ctx, |ui| {
        // Fit the canvas into the panel, keeping its aspect ratio.
        let canvas_size = app.session().canvas_size().to_vec2();
        let available = ui.available_size();
        let scale = (available.x / canvas_size.x)
            .min(available.y / canvas_size.y)
            .max(MIN_CANVAS_SCALE)
            .min(MAX_CANVAS_SCALE);

        let (canvas_rect, _response) = ui.allocate_exact_size(canvas_size * scale, Sense::drag());

        // Handle input
        app.handle_canvas_input(ctx, canvas_rect, now);

        // Render the canvas
        let painter = ui.painter_at(canvas_rect);
        painter.rect_filled(canvas_rect, 4.0, Color32::WHITE);
        if let Some(texture) = app.canvas_texture(ctx) {
            painter.image(
                texture,
                canvas_rect,
                Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        painter.rect_stroke(canvas_rect, 4.0, Stroke::new(1.0, Color32::GRAY));

        if app.session().state().is_capturing() {
            ctx.request_repaint();
        }
    });
}
