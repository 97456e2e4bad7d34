use crate::common::{ApiCommand, ApiEvent, ApiRequest, ApiResponse, SessionToken, SubjectId};
use crate::network::{NotificationHub, Subscription};

use super::alerts::{Alert, AlertSurface};
use super::composer::ChatComposer;
use super::reconciler::MessageReconciler;

/// Everything tied to one open subject: its chat view, the reply composer
/// and a push subscription. Dropping the session detaches from the push
/// channel without closing it for other consumers.
///
/// Each session has its own [`SessionToken`]; worker results carrying any
/// other token belong to a view that is gone and are discarded.
pub struct SubjectSession {
    token: SessionToken,
    reconciler: MessageReconciler,
    composer: ChatComposer,
    summary: Option<String>,
    subscription: Subscription,
}

impl SubjectSession {
    /// Subscribes to the push channel and returns the history request the
    /// caller must hand to the API worker.
    pub fn open(subject: SubjectId, hub: &NotificationHub) -> (Self, ApiRequest) {
        let token = SessionToken::new();
        log::info!("Opening chat for subject {subject} (session {token})");
        let session = Self {
            token,
            reconciler: MessageReconciler::new(subject.clone()),
            composer: ChatComposer::default(),
            summary: None,
            subscription: hub.subscribe(),
        };
        (session, ApiRequest::new(token, ApiCommand::LoadHistory(subject)))
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn subject(&self) -> &SubjectId {
        self.reconciler.subject()
    }

    pub fn reconciler(&self) -> &MessageReconciler {
        &self.reconciler
    }

    pub fn composer(&self) -> &ChatComposer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut ChatComposer {
        &mut self.composer
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Applies buffered push notifications. Returns how many were added.
    pub fn poll_live(&mut self) -> usize {
        self.subscription
            .drain()
            .iter()
            .filter(|notification| self.reconciler.apply(notification))
            .count()
    }

    /// Waits for the next notification and applies it. Returns `None` once
    /// the channel is gone.
    pub async fn next_live(&mut self) -> Option<bool> {
        let notification = self.subscription.recv().await?;
        Some(self.reconciler.apply(&notification))
    }

    pub fn submit_reply(&mut self) -> Option<ApiRequest> {
        let subject = self.reconciler.subject().clone();
        let command = self.composer.submit(&subject)?;
        Some(ApiRequest::new(self.token, command))
    }

    pub fn request_summary(&self) -> ApiRequest {
        ApiRequest::new(self.token, ApiCommand::LoadSummary(self.subject().clone()))
    }

    /// Applies a worker result. Results requested by another session (a view
    /// closed while its request was in flight, even for the same subject) are
    /// discarded; returns whether the result was used.
    pub fn handle_api_response(&mut self, response: ApiResponse) -> bool {
        if response.session != self.token {
            log::debug!(
                "Discarding API result for {} from closed session {}",
                response.event.subject(),
                response.session
            );
            return false;
        }
        self.apply_event(response.event)
    }

    fn apply_event(&mut self, event: ApiEvent) -> bool {
        if event.subject() != self.subject() {
            log::warn!(
                "API result for {} delivered to session of {}",
                event.subject(),
                self.subject()
            );
            return false;
        }

        match event {
            ApiEvent::HistoryLoaded { messages, .. } => self.reconciler.apply_history(messages),
            ApiEvent::HistoryFailed { .. } => self.reconciler.history_failed(),
            ApiEvent::ReplySent { content, .. } => {
                let message = self.composer.on_sent(&content);
                self.reconciler.push_local(message);
            }
            ApiEvent::ReplyFailed { error, .. } => self.composer.on_failed(error),
            ApiEvent::SummaryLoaded { summary, .. } => self.summary = Some(summary),
            ApiEvent::SummaryFailed { .. } => self.summary = None,
        }
        true
    }
}

/// The alert surface fed by its own push subscription.
pub struct AlertFeed {
    surface: AlertSurface,
    subscription: Subscription,
}

impl AlertFeed {
    pub fn new(hub: &NotificationHub, capacity: usize) -> Self {
        Self {
            surface: AlertSurface::new(capacity),
            subscription: hub.subscribe(),
        }
    }

    pub fn surface(&self) -> &AlertSurface {
        &self.surface
    }

    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.surface.alerts()
    }

    pub fn poll(&mut self) -> usize {
        self.subscription
            .drain()
            .iter()
            .filter(|notification| self.surface.push(notification))
            .count()
    }

    /// Waits for the next notification and records it. Returns `None` once
    /// the channel is gone.
    pub async fn next(&mut self) -> Option<Alert> {
        loop {
            let notification = self.subscription.recv().await?;
            if self.surface.push(&notification) {
                return Some(Alert::from(&notification));
            }
        }
    }

    pub fn dismiss(&mut self, id: &str) -> Option<Alert> {
        self.surface.dismiss(id)
    }
}
