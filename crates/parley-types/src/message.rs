use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Who authored a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One transcript entry.
///
/// Bot text is stored as plain text; anything the backend sends is passed
/// through [`crate::to_plain_text`] before it lands here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    /// Local wall-clock time, `HH:MM`
    pub time: String,
    #[serde(default)]
    pub is_loading: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            time: format_time(&Local::now()),
            is_loading: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            time: format_time(&Local::now()),
            is_loading: false,
        }
    }

    /// Empty bot entry shown while a reply is outstanding
    pub fn placeholder() -> Self {
        Self {
            is_loading: true,
            ..Self::bot("")
        }
    }

    /// Resolve a placeholder with the final reply text
    pub fn fill(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.is_loading = false;
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Format a timestamp as zero-padded `HH:MM` in its own timezone
pub fn format_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M").to_string()
}
