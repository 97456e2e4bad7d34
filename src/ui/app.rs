use eframe::egui;
use matru_live::common::{ApiRequest, ApiResponse, SubjectId};
use matru_live::network::NotificationHub;
use matru_live::sync::{AlertFeed, SubjectSession};
use tokio::sync::mpsc;

use super::components::{alert_overlay, chat_area, input_bar, sidebar};
use super::state::AppState;

pub struct MonitorApp {
    state: AppState,
    hub: NotificationHub,
    command_sender: mpsc::Sender<ApiRequest>,
    event_receiver: mpsc::Receiver<ApiResponse>,
}

impl MonitorApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        hub: NotificationHub,
        command_sender: mpsc::Sender<ApiRequest>,
        event_receiver: mpsc::Receiver<ApiResponse>,
        alert_capacity: usize,
        initial_subject: Option<SubjectId>,
    ) -> Self {
        let alerts = AlertFeed::new(&hub, alert_capacity);
        let mut app = Self {
            state: AppState::new(alerts),
            hub,
            command_sender,
            event_receiver,
        };
        if let Some(subject) = initial_subject {
            app.open_subject(subject);
        }
        app
    }

    fn handle_api_events(&mut self) {
        while let Ok(response) = self.event_receiver.try_recv() {
            match self.state.session.as_mut() {
                Some(session) => {
                    session.handle_api_response(response);
                }
                None => log::debug!(
                    "No chat open; dropping API result for {}",
                    response.event.subject()
                ),
            }
        }
    }

    fn open_subject(&mut self, subject: SubjectId) {
        if self
            .state
            .session
            .as_ref()
            .is_some_and(|session| session.subject() == &subject)
        {
            return;
        }
        // Detach the previous view before subscribing the new one.
        self.state.session = None;
        let (session, load_history) = SubjectSession::open(subject, &self.hub);
        self.state.session = Some(session);
        self.send_command(load_history);
    }

    fn send_reply(&mut self) {
        let Some(request) = self.state.session.as_mut().and_then(SubjectSession::submit_reply)
        else {
            return;
        };
        if let Err(err) = self.command_sender.try_send(request) {
            log::warn!("Failed to queue reply: {err}");
            if let Some(session) = self.state.session.as_mut() {
                session.composer_mut().on_failed(err.to_string());
            }
        }
    }

    fn send_command(&mut self, request: ApiRequest) {
        if let Err(err) = self.command_sender.try_send(request) {
            log::warn!("Failed to send command to API worker: {err}");
        }
    }
}

impl eframe::App for MonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_api_events();
        self.state.poll_live();

        let sidebar_actions = egui::SidePanel::left("subject_sidebar")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| sidebar::render(ui, &mut self.state))
            .inner;
        if let Some(subject) = sidebar_actions.open_subject {
            self.open_subject(subject);
        }

        let mut send = false;
        let mut request_summary = false;
        egui::CentralPanel::default().show(ctx, |ui| match self.state.session.as_mut() {
            Some(session) => {
                request_summary = chat_area::render(ui, session).request_summary;
                ui.separator();
                send = input_bar::render(ui, session.composer_mut());
            }
            None => {
                ui.heading("MatruKavach Live");
                ui.label("Open a mother's record to start chatting.");
            }
        });
        if send {
            self.send_reply();
        }
        if request_summary {
            if let Some(request) = self.state.session.as_ref().map(SubjectSession::request_summary) {
                self.send_command(request);
            }
        }

        let alert_actions = alert_overlay::render(ctx, &self.state.alerts);
        if let Some(id) = alert_actions.dismiss {
            self.state.alerts.dismiss(&id);
        }
        if let Some(subject) = alert_actions.open_subject {
            self.open_subject(subject);
        }

        ctx.request_repaint();
    }
}
