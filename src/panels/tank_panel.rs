use egui::{Color32, Id, Vec2, vec2};

use crate::app::{Card, DoodleApp};
use crate::gallery::{FilterOption, GalleryId, SortOption, VoteDirection};

/// Card size at scale 1.0, in points.
const CARD_SIZE: Vec2 = vec2(120.0, 72.0);
const WATER: Color32 = Color32::from_rgb(18, 74, 122);

enum CardAction {
    Vote(GalleryId, VoteDirection),
    Hide(GalleryId),
}

pub fn tank_panel(app: &mut DoodleApp, ctx: &egui::Context, now: f64) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.horizontal(|ui| {
            let mut query = app.list_query();
            egui::ComboBox::from_label("Sort")
                .selected_text(query.sort.label())
                .show_ui(ui, |ui| {
                    for sort in SortOption::ALL {
                        ui.selectable_value(&mut query.sort, sort, sort.label());
                    }
                });
            egui::ComboBox::from_label("Show")
                .selected_text(query.filter.label())
                .show_ui(ui, |ui| {
                    for filter in FilterOption::ALL {
                        ui.selectable_value(&mut query.filter, filter, filter.label());
                    }
                });
            app.set_list_query(query);

            if ui.button("⟳ Refresh").clicked() {
                app.refresh_gallery();
            }
        });

        let tank = ui.available_rect_before_wrap();
        ui.painter().rect_filled(tank, 8.0, WATER);

        let cards = app.tick_cards(now);
        if cards.is_empty() {
            ui.painter().text(
                tank.center(),
                egui::Align2::CENTER_CENTER,
                "The tank is empty. Draw something!",
                egui::FontId::proportional(18.0),
                Color32::WHITE,
            );
        }

        let mut actions = Vec::new();
        for card in &cards {
            let center = tank.min
                + vec2(
                    card.position.left / 100.0 * tank.width(),
                    card.position.top / 100.0 * tank.height(),
                );
            let size = CARD_SIZE * card.scale;
            let texture = app.thumbnail(ctx, &card.item);
            let voted = app.has_voted(&card.item.id);

            egui::Area::new(Id::new(("tank_card", card.item.id.as_str())))
                .fixed_pos(center - size / 2.0)
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        card_contents(ui, card, texture, size, voted, &mut actions);
                    });
                });
        }

        for action in actions {
            match action {
                CardAction::Vote(id, direction) => app.vote(&id, direction),
                CardAction::Hide(id) => app.delete(&id),
            }
        }
    });

    if app.is_tank_animating() {
        ctx.request_repaint();
    }
}

fn card_contents(
    ui: &mut egui::Ui,
    card: &Card,
    texture: Option<egui::TextureId>,
    size: Vec2,
    voted: bool,
    actions: &mut Vec<CardAction>,
) {
    match texture {
        Some(texture) => {
            ui.image((texture, size));
        }
        None => {
            ui.allocate_space(size);
        }
    }

    let item = &card.item;
    ui.horizontal(|ui| {
        ui.add_enabled_ui(!voted, |ui| {
            if ui.small_button(format!("👍 {}", item.upvotes)).clicked() {
                actions.push(CardAction::Vote(item.id.clone(), VoteDirection::Up));
            }
            if ui.small_button(format!("👎 {}", item.downvotes)).clicked() {
                actions.push(CardAction::Vote(item.id.clone(), VoteDirection::Down));
            }
        });
        if let Some(score) = item.ai_score {
            let label = format!("{:.0}%", score * 100.0);
            if item.is_match() {
                ui.colored_label(Color32::from_rgb(34, 197, 94), label);
            } else {
                ui.weak(label);
            }
        }
        if ui.small_button("✖").on_hover_text("Hide from the tank").clicked() {
            actions.push(CardAction::Hide(item.id.clone()));
        }
    });
}
