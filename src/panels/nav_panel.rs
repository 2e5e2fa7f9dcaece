use crate::app::{DoodleApp, View};

pub fn nav_panel(app: &mut DoodleApp, ctx: &egui::Context, now: f64) {
    egui::TopBottomPanel::top("nav_panel").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading("Doodle Tank");
            ui.separator();

            for (view, label) in [(View::Draw, "✏ Draw"), (View::Tank, "🌊 Tank")] {
                if ui.selectable_label(app.view() == view, label).clicked() {
                    app.set_view(view, now);
                }
            }

            if let Some(status) = app.status() {
                ui.separator();
                ui.label(status);
            }
        });
    });
}
