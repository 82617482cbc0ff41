use std::cmp::Reverse;
use std::sync::Arc;

use parley_client::ChatBackend;
use parley_types::{greeting, reconstruct_history, Conversation, Message};
use tokio::sync::watch;

use crate::error::{CoreError, Result};
use crate::session::SessionStore;

/// Gate in front of destructive actions; answers whether the user agreed
pub trait Confirm: Send + Sync {
    fn confirm(&self, conversation: &Conversation) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&Conversation) -> bool + Send + Sync,
{
    fn confirm(&self, conversation: &Conversation) -> bool {
        self(conversation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// Everything the chat view renders
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    /// Newest first
    pub conversations: Vec<Conversation>,
    pub current_id: Option<String>,
}

impl ConversationState {
    pub fn current(&self) -> Option<&Conversation> {
        let id = self.current_id.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        self.current().map(|c| c.messages.as_slice()).unwrap_or(&[])
    }

    pub fn is_streaming(&self) -> bool {
        self.current().is_some_and(|c| c.streaming)
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut Conversation> {
        let id = self.current_id.clone()?;
        self.get_mut(&id)
    }
}

/// Owns the conversation list and the transcript of the selected one.
///
/// State lives in a watch channel: mutations go through `send_modify` and
/// are never held across an await, and every change reaches subscribers.
pub struct ConversationStore {
    backend: Arc<dyn ChatBackend>,
    session: Arc<SessionStore>,
    state: watch::Sender<ConversationState>,
}

impl ConversationStore {
    pub fn new(backend: Arc<dyn ChatBackend>, session: Arc<SessionStore>) -> Self {
        let (state, _) = watch::channel(ConversationState::default());
        Self {
            backend,
            session,
            state,
        }
    }

    /// Load the signed-in user's threads and open the newest one.
    ///
    /// A user with no threads gets a fresh local conversation.
    pub async fn init_user(&self) -> Result<()> {
        let response = self
            .backend
            .user_threads()
            .await
            .map_err(|e| self.note_failure("list threads", e))?;

        if response.threads.is_empty() {
            tracing::debug!("No threads on record, starting a new chat");
            self.create_new_chat();
            return Ok(());
        }

        let mut conversations: Vec<Conversation> = response
            .threads
            .iter()
            .map(Conversation::from_thread)
            .collect();
        conversations.sort_by_key(|c| Reverse(c.timestamp));
        let first = conversations[0].id.clone();

        tracing::info!(count = conversations.len(), "Loaded conversations");
        self.state.send_modify(|state| {
            state.conversations = conversations;
            state.current_id = None;
        });

        self.select_conversation(&first).await
    }

    /// Start a local conversation at the top of the list and make it current.
    /// Returns its thread id.
    pub fn create_new_chat(&self) -> String {
        let mut conversation = Conversation::new();
        conversation
            .messages
            .push(Message::bot(greeting(self.session.current_user().as_deref())));
        let id = conversation.id.clone();

        tracing::debug!(thread_id = %id, "Created conversation");
        self.state.send_modify(|state| {
            state.conversations.insert(0, conversation);
            state.current_id = Some(id.clone());
        });

        id
    }

    /// Make `id` current and reload its transcript from the backend.
    ///
    /// On failure the transcript is left as it was. While a reply for the
    /// conversation is outstanding the live transcript is kept instead of
    /// being replaced by the stored history.
    pub async fn select_conversation(&self, id: &str) -> Result<()> {
        let exists = self.state.send_if_modified(|state| {
            if state.get(id).is_none() {
                return false;
            }
            state.current_id = Some(id.to_string());
            true
        });
        if !exists {
            return Err(CoreError::ConversationNotFound(id.to_string()));
        }

        let history = self
            .backend
            .thread_history(id)
            .await
            .map_err(|e| self.note_failure("load thread history", e))?;

        if let Some(error) = history.error.as_deref() {
            tracing::warn!(thread_id = %id, "Backend reported history error: {}", error);
            return Ok(());
        }

        let mut messages = reconstruct_history(&history);
        if messages.is_empty() {
            messages.push(Message::bot(greeting(self.session.current_user().as_deref())));
        }

        self.state.send_if_modified(|state| match state.get_mut(id) {
            Some(conversation) if !conversation.streaming => {
                conversation.messages = messages;
                true
            }
            _ => false,
        });

        Ok(())
    }

    /// Delete a thread after the user confirms.
    ///
    /// Removing the current conversation moves the selection to the one that
    /// followed it (or the new last one); removing the last conversation
    /// starts a fresh chat.
    pub async fn delete_conversation(&self, id: &str, confirm: &dyn Confirm) -> Result<DeleteOutcome> {
        let conversation = self
            .state
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::ConversationNotFound(id.to_string()))?;

        if !confirm.confirm(&conversation) {
            tracing::debug!(thread_id = %id, "Delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        let response = self
            .backend
            .delete_thread(id)
            .await
            .map_err(|e| self.note_failure("delete thread", e))?;
        if !response.success {
            tracing::warn!(thread_id = %id, "Backend refused delete");
            return Err(CoreError::DeleteRejected(id.to_string()));
        }

        let mut next = None;
        let mut was_current = false;
        self.state.send_modify(|state| {
            let Some(index) = state.conversations.iter().position(|c| c.id == id) else {
                return;
            };
            state.conversations.remove(index);

            if state.current_id.as_deref() == Some(id) {
                was_current = true;
                state.current_id = None;
                next = state
                    .conversations
                    .get(index)
                    .or_else(|| state.conversations.last())
                    .map(|c| c.id.clone());
            }
        });
        tracing::info!(thread_id = %id, "Deleted conversation");

        if was_current {
            match next {
                Some(next) => self.select_conversation(&next).await?,
                None => {
                    self.create_new_chat();
                }
            }
        }

        Ok(DeleteOutcome::Deleted)
    }

    /// Forget everything; used on sign-out
    pub fn clear(&self) {
        self.state.send_replace(ConversationState::default());
    }

    pub fn snapshot(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.state.borrow().conversations.clone()
    }

    pub fn current(&self) -> Option<Conversation> {
        self.state.borrow().current().cloned()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.borrow().messages().to_vec()
    }

    pub fn is_streaming(&self) -> bool {
        self.state.borrow().is_streaming()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    /// Apply `f` to the shared state, publishing only if it reports a change
    pub(crate) fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut ConversationState) -> bool,
    {
        self.state.send_if_modified(f)
    }

    /// Log a backend failure. A 401 drops the session and, with it, every
    /// thread loaded for that user.
    fn note_failure(&self, action: &str, error: parley_client::ClientError) -> CoreError {
        if error.is_unauthorized() {
            tracing::warn!("Session expired while trying to {}", action);
            self.session.invalidate();
            self.clear();
        } else {
            tracing::error!("Failed to {}: {}", action, error);
        }
        CoreError::Client(error)
    }
}
