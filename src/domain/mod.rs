use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

pub mod repositories;

/// A single ingested notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub id: String,
    pub content: String,
    #[serde(rename = "appName")]
    pub app_name: String,
    pub time: String,
    #[serde(rename = "createdAt", serialize_with = "serialize_iso")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "isFavorite")]
    pub is_favorite: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl LogRecord {
    /// Builds a fresh record from an inbound payload.
    ///
    /// Decoding is permissive: strings are taken as-is, numbers and booleans
    /// become their JSON text, anything else falls back to an empty string.
    /// Nothing here can fail.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        let created_at = now_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            content: coerce_text(payload.get("content")).unwrap_or_default(),
            app_name: coerce_text(payload.get("appName")).unwrap_or_default(),
            time: created_at.with_timezone(&Local).format("%H:%M:%S").to_string(),
            created_at,
            is_favorite: false,
            kind: coerce_text(payload.get("type")),
        }
    }
}

fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => Some(String::new()),
    }
}

/// Current UTC time truncated to whole milliseconds, the precision the store keeps.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

fn serialize_iso<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(default = "default_skip")]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            skip: default_skip(),
            limit: default_limit(),
        }
    }
}

pub const MAX_LIMIT: i64 = 100;

fn default_skip() -> i64 {
    0
}
fn default_limit() -> i64 {
    30
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FavoriteUpdated {
    pub id: String,
    #[serde(rename = "isFavorite")]
    pub is_favorite: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LogDeleted {
    pub id: String,
    pub deleted: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BulkDeleted {
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
    /// The requested ids, echoed back as received.
    #[serde(rename = "deletedIds")]
    pub deleted_ids: Vec<Value>,
}
