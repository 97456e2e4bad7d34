use eframe::egui;
use matru_live::common::SubjectId;
use matru_live::sync::{Alert, AlertFeed, AlertStyle};

use super::priority_palette;

#[derive(Default)]
pub struct AlertActions {
    pub dismiss: Option<String>,
    pub open_subject: Option<SubjectId>,
}

/// Floating stack of alert cards in the bottom-right corner.
pub fn render(ctx: &egui::Context, feed: &AlertFeed) -> AlertActions {
    let mut actions = AlertActions::default();
    if feed.surface().is_empty() {
        return actions;
    }

    let time = ctx.input(|i| i.time);
    egui::Area::new(egui::Id::new("live_alerts"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.set_max_width(340.0);
            for alert in feed.alerts() {
                render_card(ui, alert, time, &mut actions);
                ui.add_space(8.0);
            }
        });

    actions
}

fn render_card(ui: &mut egui::Ui, alert: &Alert, time: f64, actions: &mut AlertActions) {
    let (fill, border, text) = priority_palette(alert.priority);
    let stroke = match alert.style() {
        AlertStyle::Pulsing => {
            let pulse = ((time * 3.0).sin() * 0.5 + 0.5) as f32;
            let alpha = (120.0 + 135.0 * pulse) as u8;
            egui::Stroke::new(
                2.5,
                egui::Color32::from_rgba_unmultiplied(border.r(), border.g(), border.b(), alpha),
            )
        }
        AlertStyle::Bordered => egui::Stroke::new(1.5, border),
        AlertStyle::Plain => egui::Stroke::NONE,
    };

    let card = egui::Frame::new()
        .fill(fill)
        .stroke(stroke)
        .corner_radius(egui::CornerRadius::same(12))
        .inner_margin(egui::Margin::same(12))
        .show(ui, |ui| {
            ui.set_width(316.0);
            ui.horizontal(|ui| {
                let icon = if alert.is_urgent() || alert.style() == AlertStyle::Bordered {
                    "⚠"
                } else {
                    "🔔"
                };
                ui.label(
                    egui::RichText::new(format!("{icon} {}", alert.subject_name))
                        .strong()
                        .color(text),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                    if ui.small_button("✕").clicked() {
                        actions.dismiss = Some(alert.id.clone());
                    }
                });
            });
            ui.label(egui::RichText::new(format!("\"{}\"", alert.content)).color(text));
            ui.label(
                egui::RichText::new(format!(
                    "From: {}    {}",
                    alert.sender,
                    alert.timestamp.format("%H:%M")
                ))
                .small()
                .color(text),
            );
        });

    let clicked = card
        .response
        .interact(egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand)
        .clicked();
    if clicked && actions.dismiss.as_deref() != Some(alert.id.as_str()) {
        actions.open_subject = Some(alert.subject_id.clone());
    }
}
