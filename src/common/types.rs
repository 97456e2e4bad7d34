use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Stable identifier of a mother record (the subject of a chat or alert).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifies one opened chat view. Reopening the same subject yields a new
/// token, so results requested by an earlier view can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Identifiers arrive as strings from the push channel and as integers from
/// the history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    pub fn into_string(self) -> String {
        match self {
            WireId::Text(text) => text,
            WireId::Number(number) => number.to_string(),
        }
    }
}

/// Timestamps arrive as ISO strings, but some producers send epoch seconds
/// or milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Text(String),
    Epoch(f64),
}

impl WireTimestamp {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            WireTimestamp::Text(raw) => parse_timestamp(raw),
            WireTimestamp::Epoch(value) if value.is_finite() => {
                // anything past year 5138 in seconds is taken as milliseconds
                let millis = if value.abs() >= 1e11 { *value } else { value * 1000.0 };
                DateTime::from_timestamp_millis(millis as i64)
            }
            WireTimestamp::Epoch(_) => None,
        }
    }
}

/// `deserialize_with` helper for optional wire fields: a value of the wrong
/// type reads as absent instead of failing the whole record.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match T::deserialize(&value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            log::warn!("Ignoring malformed field `{value}`: {err}");
            None
        }
    }))
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sender {
    #[default]
    Patient,
    Doctor,
    #[serde(rename = "ASHA")]
    Asha,
    #[serde(rename = "bot")]
    Bot,
}

impl Sender {
    /// Parses the wire value; absent or unknown senders fall back to `Patient`.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Sender::Patient,
            Some("Patient") | Some("user") => Sender::Patient,
            Some("Doctor") => Sender::Doctor,
            Some("ASHA") => Sender::Asha,
            Some("bot") => Sender::Bot,
            Some(other) => {
                log::warn!("Unknown sender `{other}`; treating as Patient");
                Sender::Patient
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::Patient => "Patient",
            Sender::Doctor => "Doctor",
            Sender::Asha => "ASHA",
            Sender::Bot => "bot",
        }
    }

    /// Messages written by the care team rather than the patient.
    pub fn is_operator(&self) -> bool {
        matches!(self, Sender::Doctor | Sender::Asha)
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency tier attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    #[default]
    Green,
    Yellow,
    Red,
}

impl Priority {
    /// Parses the wire value; absent or unknown tiers fall back to `Green`.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_uppercase()).as_deref() {
            None | Some("") | Some("GREEN") => Priority::Green,
            Some("YELLOW") => Priority::Yellow,
            Some("RED") => Priority::Red,
            Some(other) => {
                log::warn!("Unknown priority `{other}`; treating as GREEN");
                Priority::Green
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Green => "GREEN",
            Priority::Yellow => "YELLOW",
            Priority::Red => "RED",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a subject's chat view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub content: String,
    /// Text before translation, if the backend translated it.
    pub original_content: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub priority: Priority,
}

impl ChatMessage {
    /// Locally composed reply shown before the server echoes anything back.
    pub fn optimistic(content: impl Into<String>) -> Self {
        Self {
            id: format!("temp_{}", Uuid::new_v4()),
            sender: Sender::Asha,
            content: content.into(),
            original_content: None,
            timestamp: Utc::now(),
            priority: Priority::Green,
        }
    }

    pub fn is_urgent(&self) -> bool {
        self.priority == Priority::Red
    }

    /// The untranslated text, when it should be shown next to the content.
    pub fn visible_original(&self) -> Option<&str> {
        if self.sender != Sender::Patient {
            return None;
        }
        self.original_content
            .as_deref()
            .filter(|original| !original.is_empty() && *original != self.content)
    }
}

/// Live event routed to a subscriber after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub message: ChatMessage,
}

/// Generates an id for records the backend sent without one.
pub fn generated_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4())
}

/// Reads the timestamp formats the backend emits. Values without an offset
/// are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Reads a wire timestamp, falling back to the current time.
pub fn timestamp_or_now(raw: Option<&WireTimestamp>) -> DateTime<Utc> {
    match raw {
        Some(raw) => raw.to_datetime().unwrap_or_else(|| {
            log::warn!("Unparsable timestamp `{raw:?}`; using current time");
            Utc::now()
        }),
        None => Utc::now(),
    }
}
