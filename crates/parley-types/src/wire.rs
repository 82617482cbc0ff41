//! Request and response bodies exchanged with the chat backend.
//!
//! Every response field the backend may omit is optional or defaulted so a
//! partial body still decodes.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl LoginResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckAuthResponse {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub username: Option<String>,
}

/// Thread metadata as listed by `/user_threads`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadInfo {
    pub thread_id: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

impl ThreadInfo {
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_ref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserThreadsResponse {
    #[serde(default, rename = "userId")]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub threads: Vec<ThreadInfo>,
}

/// Body for the endpoints that only need a thread id
#[derive(Debug, Clone, Serialize)]
pub struct ThreadRef {
    pub thread_id: String,
}

/// Stored exchange history; `question[i]` pairs with `generation[i]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadHistory {
    #[serde(default)]
    pub question: Vec<String>,
    #[serde(default)]
    pub generation: Vec<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteThreadResponse {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub question: String,
    pub thread_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of the single-shot `/chat` endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn reply_text(&self) -> &str {
        self.response
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.message.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("I received your message!")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned by the backend on a rejected call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorPayload {
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// `message`, else `error`, else `fallback`
    pub fn display_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.error.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(fallback)
    }
}

impl From<LoginResponse> for ErrorPayload {
    fn from(resp: LoginResponse) -> Self {
        Self {
            status: resp.status,
            message: resp.message,
            error: resp.error,
        }
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_message("request rejected"))
    }
}

/// Accepts RFC 3339, RFC 2822 (Flask's default), naive `YYYY-MM-DD HH:MM:SS`
/// and epoch seconds or milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
                return Some(dt.with_timezone(&Utc));
            }
            ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => {
            let raw = n.as_f64()?;
            let millis = if raw.abs() >= 1e12 { raw } else { raw * 1000.0 };
            Utc.timestamp_millis_opt(millis as i64).single()
        }
        _ => None,
    }
}
