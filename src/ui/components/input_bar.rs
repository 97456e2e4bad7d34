use eframe::egui;
use matru_live::sync::ChatComposer;

/// Draws the reply input. Returns true when the user asked to send.
pub fn render(ui: &mut egui::Ui, composer: &mut ChatComposer) -> bool {
    let mut send = false;
    let enabled = !composer.is_sending();

    ui.horizontal(|ui| {
        let response = ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(composer.input_mut()).hint_text("Type a message..."),
        );
        let label = if enabled { "Send" } else { "Sending..." };
        if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
        }
    });

    if let Some(error) = composer.last_error() {
        ui.colored_label(egui::Color32::RED, format!("Not sent: {error}"));
    }

    send
}
