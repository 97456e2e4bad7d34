use serde::Deserialize;
use serde_json::Value;

use crate::common::types::{WireId, WireTimestamp, generated_id, lenient, timestamp_or_now};
use crate::common::{ChatMessage, Priority, Sender};

/// Chat row as `GET /mother/{id}/chat` returns it. Fields of the wrong type
/// read as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<WireId>,
    #[serde(default, deserialize_with = "lenient")]
    pub message_id: Option<WireId>,
    #[serde(default, deserialize_with = "lenient")]
    pub sender: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub raw_text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub translated_text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<WireTimestamp>,
}

impl From<ChatRecord> for ChatMessage {
    fn from(record: ChatRecord) -> Self {
        let content = record
            .translated_text
            .filter(|text| !text.is_empty())
            .or_else(|| record.raw_text.clone())
            .unwrap_or_default();

        ChatMessage {
            id: record
                .id
                .or(record.message_id)
                .map(WireId::into_string)
                .unwrap_or_else(|| generated_id("history")),
            sender: Sender::from_wire(record.sender.as_deref()),
            content,
            original_content: record.raw_text,
            timestamp: timestamp_or_now(record.timestamp.as_ref()),
            priority: Priority::from_wire(record.priority.as_deref()),
        }
    }
}

/// Converts a fetched history into chat messages, keeping server order.
/// Rows that are not records are logged and skipped.
pub fn hydrate(rows: Vec<Value>) -> Vec<ChatMessage> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match ChatRecord::deserialize(&row) {
            Ok(record) => Some(ChatMessage::from(record)),
            Err(err) => {
                log::warn!("Skipping history row {index}: {err}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn prefers_translation_and_keeps_original() {
        let messages = hydrate(records(json!([{
            "id": 1,
            "mother_id": "42",
            "sender": "Patient",
            "raw_text": "sir dard",
            "translated_text": "headache",
            "priority": "YELLOW",
            "timestamp": "2024-05-01T09:00:00",
        }])));

        let message = &messages[0];
        assert_eq!(message.id, "1");
        assert_eq!(message.content, "headache");
        assert_eq!(message.visible_original(), Some("sir dard"));
        assert_eq!(message.priority, Priority::Yellow);
    }

    #[test]
    fn fills_defaults_for_sparse_records() {
        let messages = hydrate(records(json!([
            { "message_id": "wa-9", "raw_text": "Hi" },
            { "raw_text": "Anyone?", "translated_text": null, "priority": "RED" },
        ])));

        assert_eq!(messages[0].id, "wa-9");
        assert_eq!(messages[0].sender, Sender::Patient);
        assert_eq!(messages[0].content, "Hi");
        assert_eq!(messages[0].priority, Priority::Green);
        assert!(!messages[0].is_urgent());
        assert_eq!(messages[0].visible_original(), None);

        assert!(messages[1].id.starts_with("history_"));
        assert!(messages[1].is_urgent());
    }

    #[test]
    fn keeps_server_order() {
        let messages = hydrate(records(json!([
            { "id": "b", "raw_text": "second", "timestamp": "2024-05-02T00:00:00" },
            { "id": "a", "raw_text": "first", "timestamp": "2024-05-01T00:00:00" },
        ])));
        let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn one_bad_row_does_not_lose_the_history() {
        let messages = hydrate(records(json!([
            { "id": 1, "raw_text": "Hi", "timestamp": "2024-05-01T09:00:00" },
            { "id": 2, "raw_text": "Still bleeding", "priority": "RED", "timestamp": 1714557900 },
            "not a record",
            { "id": 3, "raw_text": 404, "translated_text": "Okay" },
        ])));

        let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert!(messages[1].is_urgent());
        assert_eq!(messages[1].timestamp.timestamp(), 1_714_557_900);
        assert_eq!(messages[2].content, "Okay");
        assert_eq!(messages[2].original_content, None);
    }
}
