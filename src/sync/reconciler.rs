use std::collections::HashSet;

use crate::common::{ChatMessage, Notification, SubjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    Loading,
    Ready,
    /// The fetch failed; the view carries on with live messages only.
    Failed,
}

/// Ordered, deduplicated chat view of one subject.
///
/// History always precedes live messages. Live messages keep their arrival
/// order, including those that arrive before the history fetch completes.
/// A message id is shown at most once.
#[derive(Debug)]
pub struct MessageReconciler {
    subject: SubjectId,
    messages: Vec<ChatMessage>,
    seen: HashSet<String>,
    history: HistoryState,
}

impl MessageReconciler {
    pub fn new(subject: SubjectId) -> Self {
        Self {
            subject,
            messages: Vec::new(),
            seen: HashSet::new(),
            history: HistoryState::Loading,
        }
    }

    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn history_state(&self) -> HistoryState {
        self.history
    }

    pub fn is_loading(&self) -> bool {
        self.history == HistoryState::Loading
    }

    /// Places the fetched history in front of any live messages already
    /// shown. Only the first completed load is used.
    pub fn apply_history(&mut self, history: Vec<ChatMessage>) {
        if self.history != HistoryState::Loading {
            log::warn!("Ignoring late history for {}", self.subject);
            return;
        }

        let live = std::mem::take(&mut self.messages);
        self.seen.clear();
        for message in history.into_iter().chain(live) {
            self.insert(message);
        }
        self.history = HistoryState::Ready;
    }

    pub fn history_failed(&mut self) {
        if self.history == HistoryState::Loading {
            self.history = HistoryState::Failed;
        }
    }

    /// Appends a live notification if it belongs to this subject and has not
    /// been seen. Returns whether the view changed.
    pub fn apply(&mut self, notification: &Notification) -> bool {
        if notification.subject_id != self.subject {
            return false;
        }
        let inserted = self.insert(notification.message.clone());
        if !inserted {
            log::debug!(
                "Duplicate message {} for {} ignored",
                notification.message.id,
                self.subject
            );
        }
        inserted
    }

    /// Appends a locally composed message.
    pub fn push_local(&mut self, message: ChatMessage) -> bool {
        self.insert(message)
    }

    fn insert(&mut self, message: ChatMessage) -> bool {
        if !self.seen.insert(message.id.clone()) {
            return false;
        }
        self.messages.push(message);
        true
    }
}
