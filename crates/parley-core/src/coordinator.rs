use std::sync::Arc;

use parley_client::{ChatBackend, ClientError};
use parley_types::{to_plain_text, Message};
use serde::{Deserialize, Serialize};

use crate::conversations::ConversationStore;
use crate::session::SessionStore;

pub const FAILURE_TEXT: &str = "Sorry, I encountered an error. Please try again.";
pub const SESSION_EXPIRED_TEXT: &str = "Your session has expired. Please log in again.";

/// Which backend endpoint carries the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// `/query` with a thread id, headlines and stored history
    #[default]
    Threaded,
    /// Single-shot `/chat`, nothing stored server-side
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, no open conversation, or a reply is already outstanding
    Ignored,
    Replied,
    Failed,
    /// The backend answered 401; the session store has been cleared
    SessionExpired,
}

/// A send that passed the gate and now waits on the backend
#[derive(Debug)]
struct PendingReply {
    thread_id: String,
    placeholder: usize,
    question: String,
    /// Still carries the default name, so a backend headline may rename it
    unnamed: bool,
}

struct Reply {
    text: String,
    headline: Option<String>,
    outcome: SendOutcome,
}

/// Drives one user message through the backend and back into the transcript
pub struct ChatCoordinator {
    backend: Arc<dyn ChatBackend>,
    session: Arc<SessionStore>,
    conversations: Arc<ConversationStore>,
    mode: ChatMode,
}

impl ChatCoordinator {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        session: Arc<SessionStore>,
        conversations: Arc<ConversationStore>,
        mode: ChatMode,
    ) -> Self {
        Self {
            backend,
            session,
            conversations,
            mode,
        }
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    /// Send the composer contents, clearing them once the send is accepted
    pub async fn submit(&self, input: &mut String) -> SendOutcome {
        match self.begin(input) {
            Some(pending) => {
                input.clear();
                self.complete(pending).await
            }
            None => SendOutcome::Ignored,
        }
    }

    /// Send `text` to the current conversation.
    ///
    /// The user message and a loading placeholder are appended before the
    /// backend is called; the placeholder is filled with the reply or a
    /// failure notice afterwards. At most one send per conversation is in
    /// flight; overlapping calls return [`SendOutcome::Ignored`].
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        match self.begin(text) {
            Some(pending) => self.complete(pending).await,
            None => SendOutcome::Ignored,
        }
    }

    /// Optimistic append and single-flight check, done atomically
    fn begin(&self, text: &str) -> Option<PendingReply> {
        if text.trim().is_empty() {
            return None;
        }

        let mut pending = None;
        self.conversations.update(|state| {
            let Some(conversation) = state.current_mut() else {
                tracing::warn!("No open conversation, message dropped");
                return false;
            };
            if conversation.streaming {
                tracing::debug!(thread_id = %conversation.id, "Send ignored, reply outstanding");
                return false;
            }

            conversation.messages.push(Message::user(text));
            conversation.messages.push(Message::placeholder());
            conversation.streaming = true;

            pending = Some(PendingReply {
                thread_id: conversation.id.clone(),
                placeholder: conversation.messages.len() - 1,
                question: text.to_string(),
                unnamed: conversation.has_default_name(),
            });
            true
        });

        pending
    }

    async fn complete(&self, pending: PendingReply) -> SendOutcome {
        let reply = match self.mode {
            ChatMode::Threaded => self.ask_thread(&pending).await,
            ChatMode::Simple => self.ask_simple(&pending).await,
        };

        let PendingReply {
            thread_id,
            placeholder,
            unnamed,
            ..
        } = pending;
        let headline = reply.headline.filter(|_| unnamed);

        let delivered = self.conversations.update(|state| {
            let Some(conversation) = state.get_mut(&thread_id) else {
                return false;
            };
            if let Some(message) = conversation.messages.get_mut(placeholder) {
                message.fill(reply.text);
            }
            conversation.streaming = false;
            if let Some(headline) = headline {
                tracing::debug!(thread_id = %thread_id, headline = %headline, "Conversation renamed");
                conversation.name = headline;
            }
            true
        });
        if !delivered {
            tracing::debug!(thread_id = %thread_id, "Conversation gone before reply arrived, dropped");
        }

        reply.outcome
    }

    async fn ask_thread(&self, pending: &PendingReply) -> Reply {
        match self.backend.query(&pending.question, &pending.thread_id).await {
            Ok(response) => match response.answer {
                Some(answer) => Reply {
                    text: to_plain_text(&answer),
                    headline: response
                        .headline
                        .map(|h| h.trim().to_string())
                        .filter(|h| !h.is_empty()),
                    outcome: SendOutcome::Replied,
                },
                None => {
                    tracing::warn!(
                        thread_id = %pending.thread_id,
                        "Query returned no answer: {}",
                        response.error.as_deref().unwrap_or("empty response")
                    );
                    Self::failed()
                }
            },
            Err(e) => self.on_error(e),
        }
    }

    async fn ask_simple(&self, pending: &PendingReply) -> Reply {
        match self.backend.chat(&pending.question).await {
            Ok(response) => Reply {
                text: to_plain_text(response.reply_text()),
                headline: None,
                outcome: SendOutcome::Replied,
            },
            Err(e) => self.on_error(e),
        }
    }

    fn on_error(&self, error: ClientError) -> Reply {
        if error.is_unauthorized() {
            tracing::warn!("Session expired during send");
            self.session.invalidate();
            return Reply {
                text: SESSION_EXPIRED_TEXT.to_string(),
                headline: None,
                outcome: SendOutcome::SessionExpired,
            };
        }

        tracing::error!("Send failed: {}", error);
        Self::failed()
    }

    fn failed() -> Reply {
        Reply {
            text: FAILURE_TEXT.to_string(),
            headline: None,
            outcome: SendOutcome::Failed,
        }
    }
}
