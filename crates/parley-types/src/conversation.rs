use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::wire::ThreadInfo;

pub const DEFAULT_CONVERSATION_NAME: &str = "New Conversation";

/// A conversation thread as the client sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// A reply for this conversation is outstanding
    #[serde(skip)]
    pub streaming: bool,
}

impl Conversation {
    /// Fresh local conversation with a generated thread id
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: DEFAULT_CONVERSATION_NAME.to_string(),
            timestamp: Utc::now(),
            messages: Vec::new(),
            streaming: false,
        }
    }

    /// Rebuild from backend thread metadata; messages are loaded separately
    pub fn from_thread(thread: &ThreadInfo) -> Self {
        let name = thread
            .headline
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_CONVERSATION_NAME)
            .to_string();

        Self {
            id: thread.thread_id.clone(),
            name,
            timestamp: thread.parsed_timestamp().unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            messages: Vec::new(),
            streaming: false,
        }
    }

    pub fn has_default_name(&self) -> bool {
        self.name == DEFAULT_CONVERSATION_NAME
    }

    pub fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_user()).count()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Opening bot line for an empty conversation
pub fn greeting(username: Option<&str>) -> String {
    match username {
        Some(name) if !name.is_empty() => {
            format!("Hello, {}! How can I help you today?", name)
        }
        _ => "Hello! How can I help you today?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_conversation_defaults() {
        let a = Conversation::new();
        let b = Conversation::new();

        assert_ne!(a.id, b.id);
        assert!(a.has_default_name());
        assert!(a.messages.is_empty());
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_from_thread_blank_headline_falls_back() {
        let thread = ThreadInfo {
            thread_id: "t-1".to_string(),
            headline: Some("   ".to_string()),
            timestamp: Some(json!("2024-05-01T10:00:00Z")),
        };

        let conversation = Conversation::from_thread(&thread);
        assert_eq!(conversation.id, "t-1");
        assert_eq!(conversation.name, DEFAULT_CONVERSATION_NAME);
        assert_eq!(conversation.timestamp.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_greeting() {
        assert_eq!(greeting(Some("bob")), "Hello, bob! How can I help you today?");
        assert_eq!(greeting(None), "Hello! How can I help you today?");
    }
}
