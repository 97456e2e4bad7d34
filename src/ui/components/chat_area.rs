use eframe::egui;
use matru_live::common::{ChatMessage, Sender};
use matru_live::sync::{HistoryState, SubjectSession};

use super::priority_palette;

#[derive(Default)]
pub struct ChatAreaActions {
    pub request_summary: bool,
}

pub fn render(ui: &mut egui::Ui, session: &SubjectSession) -> ChatAreaActions {
    let mut actions = ChatAreaActions::default();
    let reconciler = session.reconciler();

    ui.horizontal(|ui| {
        ui.heading(format!("Live Communication: {}", session.subject()));
        if ui.button("Summary").clicked() {
            actions.request_summary = true;
        }
    });
    if let Some(summary) = session.summary() {
        ui.label(egui::RichText::new(summary).italics());
    }
    if reconciler.history_state() == HistoryState::Failed {
        ui.label(egui::RichText::new("History unavailable").weak());
    }
    ui.separator();

    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .max_height((ui.available_height() - 60.0).max(120.0))
        .show(ui, |ui| {
            if reconciler.is_loading() && reconciler.messages().is_empty() {
                ui.label(egui::RichText::new("Loading history...").weak());
            } else if reconciler.messages().is_empty() {
                ui.label(egui::RichText::new("No messages yet. Start conversation.").weak());
            }
            for message in reconciler.messages() {
                render_message(ui, message);
            }
        });

    actions
}

fn render_message(ui: &mut egui::Ui, message: &ChatMessage) {
    let outgoing = message.sender.is_operator();
    let layout = if outgoing {
        egui::Layout::right_to_left(egui::Align::TOP)
    } else {
        egui::Layout::left_to_right(egui::Align::TOP)
    };

    let (fill, stroke, text) = if outgoing {
        (
            egui::Color32::from_rgb(219, 39, 119),
            egui::Color32::from_rgb(219, 39, 119),
            egui::Color32::WHITE,
        )
    } else if message.sender == Sender::Bot {
        (
            egui::Color32::from_gray(240),
            egui::Color32::from_gray(200),
            egui::Color32::from_gray(60),
        )
    } else {
        priority_palette(message.priority)
    };
    let stroke_width = if message.is_urgent() { 2.0 } else { 1.0 };

    ui.with_layout(layout, |ui| {
        egui::Frame::new()
            .fill(fill)
            .stroke(egui::Stroke::new(stroke_width, stroke))
            .corner_radius(egui::CornerRadius::same(10))
            .inner_margin(egui::Margin::same(8))
            .show(ui, |ui| {
                ui.set_max_width(420.0);
                ui.vertical(|ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{}  {}",
                            message.sender,
                            message.timestamp.format("%H:%M")
                        ))
                        .small()
                        .color(text),
                    );
                    ui.label(egui::RichText::new(&message.content).color(text));
                    if let Some(original) = message.visible_original() {
                        ui.label(
                            egui::RichText::new(format!("Original: \"{original}\""))
                                .small()
                                .italics()
                                .color(text),
                        );
                    }
                });
            });
    });
    ui.add_space(6.0);
}
