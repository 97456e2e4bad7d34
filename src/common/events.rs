use serde::Deserialize;

use super::types::{
    ChatMessage, Notification, Priority, Sender, SessionToken, SubjectId, WireId, WireTimestamp, generated_id,
    lenient, timestamp_or_now,
};
use crate::error::PushError;

/// Name of the only push event the backend emits.
pub const NEW_NOTIFICATION: &str = "new_notification";

/// Results the background API worker reports back to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiEvent {
    HistoryLoaded {
        subject: SubjectId,
        messages: Vec<ChatMessage>,
    },
    HistoryFailed {
        subject: SubjectId,
        error: String,
    },
    ReplySent {
        subject: SubjectId,
        content: String,
    },
    ReplyFailed {
        subject: SubjectId,
        content: String,
        error: String,
    },
    SummaryLoaded {
        subject: SubjectId,
        summary: String,
    },
    SummaryFailed {
        subject: SubjectId,
        error: String,
    },
}

impl ApiEvent {
    pub fn subject(&self) -> &SubjectId {
        match self {
            ApiEvent::HistoryLoaded { subject, .. }
            | ApiEvent::HistoryFailed { subject, .. }
            | ApiEvent::ReplySent { subject, .. }
            | ApiEvent::ReplyFailed { subject, .. }
            | ApiEvent::SummaryLoaded { subject, .. }
            | ApiEvent::SummaryFailed { subject, .. } => subject,
        }
    }
}

/// A worker result addressed to the chat view that asked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub session: SessionToken,
    pub event: ApiEvent,
}

/// `new_notification` payload exactly as the backend sends it. Every field
/// is optional on the wire and a field of the wrong type reads as absent;
/// [`NotificationPayload::normalize`] fills the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<WireId>,
    #[serde(default, deserialize_with = "lenient")]
    pub mother_id: Option<WireId>,
    #[serde(default, deserialize_with = "lenient")]
    pub mother_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sender: Option<String>,
    /// Ignored on input: urgency is derived from `priority`.
    #[serde(default, deserialize_with = "lenient")]
    pub is_urgent: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<WireTimestamp>,
}

impl NotificationPayload {
    /// The single place push defaults are applied.
    pub fn normalize(self) -> Result<Notification, PushError> {
        let subject_id = self
            .mother_id
            .map(|id| SubjectId::new(id.into_string()))
            .filter(|id| !id.as_str().is_empty())
            .ok_or(PushError::MissingSubject)?;

        let priority = Priority::from_wire(self.priority.as_deref());
        if let Some(flag) = self.is_urgent {
            if flag != (priority == Priority::Red) {
                log::debug!("Payload is_urgent={flag} disagrees with priority {priority}");
            }
        }

        let message = ChatMessage {
            id: self
                .id
                .map(WireId::into_string)
                .unwrap_or_else(|| generated_id("live")),
            sender: Sender::from_wire(self.sender.as_deref()),
            content: self.content.unwrap_or_default(),
            original_content: None,
            timestamp: timestamp_or_now(self.timestamp.as_ref()),
            priority,
        };

        Ok(Notification {
            subject_name: self
                .mother_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| subject_id.to_string()),
            subject_id,
            message,
        })
    }
}

impl TryFrom<serde_json::Value> for Notification {
    type Error = PushError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let payload: NotificationPayload = serde_json::from_value(value)?;
        payload.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_priority_is_green_and_not_urgent() {
        let notification = Notification::try_from(json!({
            "id": "5",
            "mother_id": "42",
            "mother_name": "Sita",
            "content": "Feeling fine",
        }))
        .unwrap();

        assert_eq!(notification.message.priority, Priority::Green);
        assert!(!notification.message.is_urgent());
        assert_eq!(notification.message.sender, Sender::Patient);
        assert_eq!(notification.subject_id, SubjectId::from("42"));
    }

    #[test]
    fn red_priority_is_urgent_even_when_flag_disagrees() {
        let notification = Notification::try_from(json!({
            "id": "6",
            "mother_id": "42",
            "content": "I feel dizzy",
            "priority": "RED",
            "is_urgent": false,
            "timestamp": "2024-05-01 10:00:00.5",
        }))
        .unwrap();

        assert!(notification.message.is_urgent());
        assert_eq!(notification.subject_name, "42");
    }

    #[test]
    fn numeric_ids_and_missing_fields_are_filled() {
        let notification = Notification::try_from(json!({ "mother_id": 7 })).unwrap();
        assert_eq!(notification.subject_id.as_str(), "7");
        assert!(notification.message.id.starts_with("live_"));
        assert_eq!(notification.message.content, "");
    }

    #[test]
    fn payload_without_subject_is_rejected() {
        let err = Notification::try_from(json!({ "content": "orphan" })).unwrap_err();
        assert!(matches!(err, PushError::MissingSubject));

        let err = Notification::try_from(json!({ "mother_id": { "id": 42 } })).unwrap_err();
        assert!(matches!(err, PushError::MissingSubject));
    }

    #[test]
    fn numeric_timestamp_still_delivers_urgent_alert() {
        let notification = Notification::try_from(json!({
            "id": "8",
            "mother_id": "42",
            "content": "I feel dizzy",
            "priority": "RED",
            "timestamp": 1714557900,
        }))
        .unwrap();

        assert!(notification.message.is_urgent());
        assert_eq!(notification.message.content, "I feel dizzy");
        assert_eq!(notification.message.timestamp.timestamp(), 1_714_557_900);
    }

    #[test]
    fn mistyped_optional_fields_fall_back_to_defaults() {
        let notification = Notification::try_from(json!({
            "id": 9,
            "mother_id": "42",
            "mother_name": 12,
            "content": "Swelling in feet",
            "sender": ["Patient"],
            "is_urgent": "yes",
            "priority": 3,
            "timestamp": { "at": "noon" },
        }))
        .unwrap();

        assert_eq!(notification.message.id, "9");
        assert_eq!(notification.subject_name, "42");
        assert_eq!(notification.message.content, "Swelling in feet");
        assert_eq!(notification.message.sender, Sender::Patient);
        assert_eq!(notification.message.priority, Priority::Green);
    }
}
