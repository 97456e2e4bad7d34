use matru_live::common::SubjectId;
use matru_live::sync::{AlertFeed, SubjectSession};

const RECENT_SUBJECT_LIMIT: usize = 20;

/// Local UI state.
pub struct AppState {
    pub session: Option<SubjectSession>,
    pub alerts: AlertFeed,
    pub subject_input: String,
    /// Subjects seen in alerts, most recent first, with display names.
    pub recent_subjects: Vec<(SubjectId, String)>,
}

impl AppState {
    pub fn new(alerts: AlertFeed) -> Self {
        Self {
            session: None,
            alerts,
            subject_input: String::new(),
            recent_subjects: Vec::new(),
        }
    }

    /// Drains push notifications into the open chat and the alert overlay.
    pub fn poll_live(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.poll_live();
        }

        let added = self.alerts.poll();
        if added == 0 {
            return;
        }
        let fresh: Vec<_> = self
            .alerts
            .alerts()
            .take(added)
            .map(|alert| (alert.subject_id.clone(), alert.subject_name.clone()))
            .collect();
        for (subject, name) in fresh.into_iter().rev() {
            self.remember_subject(subject, name);
        }
    }

    fn remember_subject(&mut self, subject: SubjectId, name: String) {
        self.recent_subjects.retain(|(known, _)| known != &subject);
        self.recent_subjects.insert(0, (subject, name));
        self.recent_subjects.truncate(RECENT_SUBJECT_LIMIT);
    }
}
