use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::common::{Notification, Priority, Sender, SubjectId};

/// How an alert card is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStyle {
    /// Red border, pulsing.
    Pulsing,
    /// Colored border.
    Bordered,
    Plain,
}

impl From<Priority> for AlertStyle {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Red => AlertStyle::Pulsing,
            Priority::Yellow => AlertStyle::Bordered,
            Priority::Green => AlertStyle::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: String,
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub content: String,
    pub sender: Sender,
    pub priority: Priority,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn is_urgent(&self) -> bool {
        self.priority == Priority::Red
    }

    pub fn style(&self) -> AlertStyle {
        self.priority.into()
    }
}

impl From<&Notification> for Alert {
    fn from(notification: &Notification) -> Self {
        let message = &notification.message;
        Self {
            id: message.id.clone(),
            subject_id: notification.subject_id.clone(),
            subject_name: notification.subject_name.clone(),
            content: message.content.clone(),
            sender: message.sender,
            priority: message.priority,
            timestamp: message.timestamp,
        }
    }
}

/// Global alert list, newest first, for every subject.
///
/// Holds at most `capacity` alerts; the oldest is evicted when a new one
/// arrives at capacity.
///
/// Unlike a plain prepend-everything feed, a redelivered event whose id is
/// already on screen is not added twice. Only visible alerts are checked, so
/// a dismissed alert comes back if the server delivers it again.
#[derive(Debug)]
pub struct AlertSurface {
    alerts: VecDeque<Alert>,
    capacity: usize,
}

impl AlertSurface {
    pub fn new(capacity: usize) -> Self {
        Self {
            alerts: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Records a notification. Returns whether a new alert was added.
    pub fn push(&mut self, notification: &Notification) -> bool {
        // only on-screen alerts are checked
        if self.alerts.iter().any(|a| a.id == notification.message.id) {
            log::debug!("Alert {} already shown", notification.message.id);
            return false;
        }

        log::info!(
            "[{}] alert for {} ({}): {}",
            notification.message.priority,
            notification.subject_name,
            notification.subject_id,
            notification.message.content
        );
        self.alerts.push_front(Alert::from(notification));
        if self.alerts.len() > self.capacity {
            if let Some(evicted) = self.alerts.pop_back() {
                log::debug!("Alert {} evicted at capacity {}", evicted.id, self.capacity);
            }
        }
        true
    }

    /// Removes the alert with this id. Client-side only.
    pub fn dismiss(&mut self, id: &str) -> Option<Alert> {
        let index = self.alerts.iter().position(|alert| alert.id == id)?;
        self.alerts.remove(index)
    }
}
