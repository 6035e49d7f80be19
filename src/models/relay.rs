use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };
use std::collections::BTreeMap;

use super::chat::Message;

/// Body of `POST /chat`. `prompt` stays optional so a missing prompt becomes a
/// 400 with a JSON error rather than an extractor rejection.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatReply {
    pub fn new(reply: String) -> Self {
        Self { reply, success: true, timestamp: Utc::now() }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl ErrorReply {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), success: false, timestamp: Utc::now() }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ApiInfo {
    pub message: String,
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub endpoints: BTreeMap<String, String>,
    pub provider: String,
    pub model: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub uptime: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundReply {
    pub error: String,
    pub available_endpoints: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
