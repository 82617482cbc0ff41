use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use parley_core::{
    ChatCoordinator, ChatMode, Confirm, Conversation, ConversationStore, DeleteOutcome, Route,
    SendOutcome, SessionStore,
};
use rustyline::error::ReadlineError;

use super::{LineEditor, ViewExit};
use crate::render;

const HELP: &str = "\
/new            start a new conversation
/list           list conversations
/select <n>     open conversation n
/delete <n>     delete conversation n
/history        reprint the current transcript
/logout         sign out
/quit           exit";

/// Asks on the terminal before a conversation is deleted
struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, conversation: &Conversation) -> bool {
        print!("Delete \"{}\"? [y/N] ", conversation.name);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

pub struct ChatView {
    session: Arc<SessionStore>,
    conversations: Arc<ConversationStore>,
    coordinator: Arc<ChatCoordinator>,
    assistant: String,
}

impl ChatView {
    pub fn new(
        session: Arc<SessionStore>,
        conversations: Arc<ConversationStore>,
        coordinator: Arc<ChatCoordinator>,
        assistant: impl Into<String>,
    ) -> Self {
        Self {
            session,
            conversations,
            coordinator,
            assistant: assistant.into(),
        }
    }

    pub async fn run(&self, editor: &mut LineEditor) -> Result<ViewExit> {
        if let Err(e) = self.enter().await {
            render::error(&format!("Could not load conversations: {}", e));
            if e.is_unauthorized() {
                self.conversations.clear();
                return Ok(ViewExit::Navigate(Route::Login));
            }
        }

        let user = self.session.current_user().unwrap_or_default();
        println!("{}", format!("Chatting as {} (/help for commands)", user).bright_white().bold());
        render::transcript(&self.conversations.messages(), &self.assistant);

        loop {
            if !self.session.is_authenticated() {
                self.conversations.clear();
                return Ok(ViewExit::Navigate(Route::Login));
            }

            let line = match editor.readline("> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(ViewExit::Quit),
                Err(e) => return Err(e.into()),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let _ = editor.add_history_entry(trimmed);

            if trimmed.starts_with('/') {
                if let Some(exit) = self.command(trimmed).await {
                    return Ok(exit);
                }
                continue;
            }

            self.send(line).await;
        }
    }

    async fn enter(&self) -> parley_core::Result<()> {
        if self.conversations.current().is_some() {
            return Ok(());
        }
        match self.coordinator.mode() {
            ChatMode::Threaded => self.conversations.init_user().await,
            ChatMode::Simple => {
                self.conversations.create_new_chat();
                Ok(())
            }
        }
    }

    async fn send(&self, mut input: String) {
        println!("{}", "…".dimmed());
        let outcome = self.coordinator.submit(&mut input).await;

        match outcome {
            SendOutcome::Ignored if self.conversations.current().is_none() => {
                render::notice("No conversation is open (/new starts one)")
            }
            SendOutcome::Ignored => render::notice("A reply is still on its way"),
            _ => {
                if let Some(reply) = self.conversations.messages().last() {
                    render::message(reply, &self.assistant);
                }
            }
        }
    }

    /// Returns `Some` when the command leaves the view
    async fn command(&self, line: &str) -> Option<ViewExit> {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        match name {
            "/quit" => return Some(ViewExit::Quit),
            "/logout" => {
                self.conversations.clear();
                return Some(ViewExit::Logout);
            }
            "/help" => println!("{}", HELP),
            "/list" => render::conversation_list(&self.conversations.snapshot()),
            "/history" => render::transcript(&self.conversations.messages(), &self.assistant),
            "/new" => {
                if self.coordinator.mode() == ChatMode::Simple {
                    render::notice("Simple mode keeps a single conversation");
                } else {
                    self.conversations.create_new_chat();
                    render::transcript(&self.conversations.messages(), &self.assistant);
                }
            }
            "/select" | "/delete" if self.coordinator.mode() == ChatMode::Simple => {
                render::notice("Simple mode keeps a single conversation")
            }
            "/select" => match self.pick(arg) {
                Some(conversation) => {
                    if let Err(e) = self.conversations.select_conversation(&conversation.id).await {
                        render::error(&format!("Could not load history: {}", e));
                    }
                    render::transcript(&self.conversations.messages(), &self.assistant);
                }
                None => render::error("Usage: /select <n> (see /list)"),
            },
            "/delete" => match self.pick(arg) {
                Some(conversation) => {
                    match self
                        .conversations
                        .delete_conversation(&conversation.id, &PromptConfirm)
                        .await
                    {
                        Ok(DeleteOutcome::Deleted) => {
                            render::notice(&format!("Deleted \"{}\"", conversation.name))
                        }
                        Ok(DeleteOutcome::Cancelled) => {}
                        Err(e) => render::error(&format!("Delete failed: {}", e)),
                    }
                }
                None => render::error("Usage: /delete <n> (see /list)"),
            },
            other => render::error(&format!("Unknown command {} (try /help)", other)),
        }

        None
    }

    /// Resolve a 1-based list position
    fn pick(&self, arg: Option<&str>) -> Option<Conversation> {
        let index = arg?.parse::<usize>().ok()?.checked_sub(1)?;
        self.conversations.conversations().get(index).cloned()
    }
}
