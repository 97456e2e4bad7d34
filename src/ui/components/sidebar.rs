use eframe::egui;
use matru_live::common::SubjectId;

use crate::ui::state::AppState;

#[derive(Default)]
pub struct SidebarActions {
    pub open_subject: Option<SubjectId>,
}

pub fn render(ui: &mut egui::Ui, state: &mut AppState) -> SidebarActions {
    let mut actions = SidebarActions::default();

    ui.heading("Mothers");
    ui.separator();

    ui.label("Open by ID:");
    ui.horizontal(|ui| {
        let response = ui.text_edit_singleline(&mut state.subject_input);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (ui.button("Open").clicked() || submitted) && !state.subject_input.trim().is_empty() {
            actions.open_subject = Some(SubjectId::new(state.subject_input.trim()));
            state.subject_input.clear();
        }
    });

    ui.separator();
    ui.label("Recently alerted:");

    if state.recent_subjects.is_empty() {
        ui.label(egui::RichText::new("No alerts yet").weak());
        return actions;
    }

    let open = state.session.as_ref().map(|session| session.subject().clone());
    for (subject, name) in &state.recent_subjects {
        let selected = open.as_ref() == Some(subject);
        if ui.selectable_label(selected, format!("{name} ({subject})")).clicked() {
            actions.open_subject = Some(subject.clone());
        }
    }

    actions
}
