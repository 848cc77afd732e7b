use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

// ─── Events ─────────────────────────────────────────────────────────────────

/// Server-assigned identifier. The server currently sends numbers, but the
/// client treats the value as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub event_type: Option<String>,
    /// Kept as the raw string; anything that is not a string on the wire
    /// (numbers, objects) is dropped here and renders as "N/A".
    #[serde(default, deserialize_with = "lenient_string")]
    pub event_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sender_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub action_link: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub reminded: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message_id: Option<String>,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        EventKind::of(self.event_type.as_deref())
    }

    /// Interviews and exams get the alert styling.
    pub fn is_urgent(&self) -> bool {
        matches!(self.kind(), EventKind::Interview | EventKind::Exam)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_bool()))
}

/// Decodes an event list one record at a time. Records without a usable id
/// are skipped so the rest of the list still shows.
pub fn decode_events(raw: Vec<serde_json::Value>) -> Vec<Event> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<Event>(value) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed event");
                None
            }
        })
        .collect()
}

/// Bucket an event falls into. `Other` is defined by exclusion, so new
/// server-side types land there until they get a category of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Interview,
    Exam,
    Other,
}

impl EventKind {
    pub fn of(event_type: Option<&str>) -> Self {
        match event_type {
            Some("Interview") => Self::Interview,
            Some("Exam") => Self::Exam,
            _ => Self::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Interview => "Interview",
            Self::Exam => "Exam",
            Self::Other => "Other",
        }
    }
}

// ─── User ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default = "default_user_name")]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

fn default_user_name() -> String {
    "User".into()
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            name: default_user_name(),
            email: String::new(),
        }
    }
}
