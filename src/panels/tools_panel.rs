use egui::color_picker::{Alpha, color_edit_button_srgba};

use crate::app::DoodleApp;
use crate::stroke::{StrokeColor, Tool};

pub fn tools_panel(app: &mut DoodleApp, ctx: &egui::Context, now: f64) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let brush = *app.brush();
            ui.horizontal(|ui| {
                for tool in [Tool::Pen, Tool::Eraser] {
                    if ui.selectable_label(brush.tool == tool, tool.label()).clicked() {
                        log::info!("Tool selected from UI: {}", tool.label());
                        app.set_tool(tool);
                    }
                }
            });

            ui.horizontal(|ui| {
                ui.label("Color:");
                let mut color = brush.color.color32();
                if color_edit_button_srgba(ui, &mut color, Alpha::OnlyBlend).changed() {
                    app.set_color(StrokeColor::from_color32(color));
                }
                ui.monospace(brush.color.to_hex());
            });

            ui.horizontal(|ui| {
                ui.label("Width:");
                let mut width = brush.width;
                if ui.add(egui::Slider::new(&mut width, 1.0..=30.0)).changed() {
                    app.set_width(width);
                }
            });

            ui.separator();

            let session = app.session();
            let has_strokes = session.has_strokes();
            let idle = !session.state().is_capturing();
            ui.horizontal(|ui| {
                if ui.add_enabled(has_strokes && idle, egui::Button::new("Undo")).clicked() {
                    app.undo(now);
                }
                if ui.button("Clear").clicked() {
                    app.clear();
                }
            });
            if ui
                .add_enabled(has_strokes && idle, egui::Button::new("Submit to tank"))
                .clicked()
            {
                app.submit(now);
            }

            ui.separator();

            let session = app.session();
            let document = session.drawing_document(now);
            ui.label(format!("Strokes: {}", document.strokes.len()));
            ui.label(format!("Points: {}", document.point_count()));
            ui.label(format!("Time: {:.1}s", document.total_duration_seconds));
            ui.label(format!("State: {}", session.state().name()));

            if let Some(report) = session.score() {
                ui.separator();
                ui.strong(format!("Match: {:.0}%", report.score * 100.0));
                ui.label(format!("Confidence: {:.0}%", report.confidence * 100.0));
            }
        });
}
