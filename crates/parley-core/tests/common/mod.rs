#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parley_client::{ChatBackend, ClientError, Result};
use parley_core::{ChatCoordinator, ChatMode, ConversationStore, SessionStore};
use parley_types::{
    ChatResponse, CheckAuthResponse, DeleteThreadResponse, ErrorPayload, HealthResponse,
    LoginResponse, QueryResponse, ThreadHistory, ThreadInfo, UserThreadsResponse,
};
use serde_json::json;
use tokio::sync::Notify;

/// Scripted reply for `/query` and `/chat`
pub enum Reply {
    Answer { answer: String, headline: Option<String> },
    Empty,
    Unauthorized,
    ServerError,
}

impl Reply {
    pub fn answer(text: &str) -> Self {
        Reply::Answer {
            answer: text.to_string(),
            headline: None,
        }
    }

    pub fn with_headline(text: &str, headline: &str) -> Self {
        Reply::Answer {
            answer: text.to_string(),
            headline: Some(headline.to_string()),
        }
    }
}

/// In-memory backend recording every call it receives
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<String>>,
    pub signed_in_as: Mutex<Option<String>>,
    pub check_auth_fails: AtomicBool,
    pub login_rejection: Mutex<Option<ErrorPayload>>,
    pub register_rejection: Mutex<Option<ErrorPayload>>,
    pub logout_fails: AtomicBool,
    pub threads: Mutex<Vec<ThreadInfo>>,
    pub histories: Mutex<HashMap<String, ThreadHistory>>,
    pub history_fails: AtomicBool,
    /// `/thread_history` alone answers 401
    pub history_expired: AtomicBool,
    pub refuse_delete: AtomicBool,
    pub replies: Mutex<VecDeque<Reply>>,
    pub session_expired: AtomicBool,
    /// When set, replies wait for a notification before returning
    pub gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == endpoint).count()
    }

    pub fn add_thread(&self, id: &str, headline: &str, timestamp: &str) {
        self.threads.lock().unwrap().push(ThreadInfo {
            thread_id: id.to_string(),
            headline: Some(headline.to_string()),
            timestamp: Some(json!(timestamp)),
        });
    }

    pub fn set_history(&self, id: &str, question: &[&str], generation: &[&str]) {
        self.histories.lock().unwrap().insert(
            id.to_string(),
            ThreadHistory {
                question: question.iter().map(|s| s.to_string()).collect(),
                generation: generation.iter().map(|s| s.to_string()).collect(),
                ..ThreadHistory::default()
            },
        );
    }

    pub fn push_reply(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn hold_replies(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    fn record(&self, endpoint: &str) {
        self.calls.lock().unwrap().push(endpoint.to_string());
    }

    fn guard_session(&self) -> Result<()> {
        if self.session_expired.load(Ordering::SeqCst) {
            Err(ClientError::Unauthorized)
        } else {
            Ok(())
        }
    }

    async fn next_reply(&self) -> Reply {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Empty)
    }
}

pub fn server_error() -> ClientError {
    ClientError::Api {
        status: 500,
        payload: ErrorPayload::from_message("boom"),
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn check_auth(&self) -> Result<CheckAuthResponse> {
        self.record("check-auth");
        if self.check_auth_fails.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        let user = self.signed_in_as.lock().unwrap().clone();
        Ok(CheckAuthResponse {
            authenticated: user.is_some(),
            username: user,
        })
    }

    async fn login(&self, username: &str, _password: &str) -> Result<LoginResponse> {
        self.record("login");
        if let Some(payload) = self.login_rejection.lock().unwrap().clone() {
            return Err(ClientError::Api { status: 401, payload });
        }
        *self.signed_in_as.lock().unwrap() = Some(username.to_string());
        Ok(LoginResponse {
            status: Some("success".to_string()),
            username: Some(username.to_string()),
            ..LoginResponse::default()
        })
    }

    async fn register(&self, _email: &str, _username: &str, _password: &str) -> Result<()> {
        self.record("register");
        match self.register_rejection.lock().unwrap().clone() {
            Some(payload) => Err(ClientError::Api { status: 409, payload }),
            None => Ok(()),
        }
    }

    async fn logout(&self) -> Result<()> {
        self.record("logout");
        *self.signed_in_as.lock().unwrap() = None;
        if self.logout_fails.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(())
    }

    async fn user_threads(&self) -> Result<UserThreadsResponse> {
        self.record("user_threads");
        self.guard_session()?;
        Ok(UserThreadsResponse {
            user_id: Some(json!(1)),
            threads: self.threads.lock().unwrap().clone(),
        })
    }

    async fn thread_history(&self, thread_id: &str) -> Result<ThreadHistory> {
        self.record("thread_history");
        self.guard_session()?;
        if self.history_expired.load(Ordering::SeqCst) {
            return Err(ClientError::Unauthorized);
        }
        if self.history_fails.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self
            .histories
            .lock()
            .unwrap()
            .get(thread_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<DeleteThreadResponse> {
        self.record("delete_thread");
        self.guard_session()?;
        let success = !self.refuse_delete.load(Ordering::SeqCst);
        if success {
            self.threads.lock().unwrap().retain(|t| t.thread_id != thread_id);
        }
        Ok(DeleteThreadResponse { success })
    }

    async fn query(&self, _question: &str, _thread_id: &str) -> Result<QueryResponse> {
        self.record("query");
        match self.next_reply().await {
            Reply::Answer { answer, headline } => Ok(QueryResponse {
                answer: Some(answer),
                headline,
                error: None,
            }),
            Reply::Empty => Ok(QueryResponse {
                error: Some("no answer".to_string()),
                ..QueryResponse::default()
            }),
            Reply::Unauthorized => Err(ClientError::Unauthorized),
            Reply::ServerError => Err(server_error()),
        }
    }

    async fn chat(&self, _message: &str) -> Result<ChatResponse> {
        self.record("chat");
        match self.next_reply().await {
            Reply::Answer { answer, .. } => Ok(ChatResponse {
                response: Some(answer),
                ..ChatResponse::default()
            }),
            Reply::Empty => Ok(ChatResponse::default()),
            Reply::Unauthorized => Err(ClientError::Unauthorized),
            Reply::ServerError => Err(server_error()),
        }
    }

    async fn health(&self) -> Result<HealthResponse> {
        self.record("health");
        Ok(HealthResponse {
            status: Some("healthy".to_string()),
            message: None,
        })
    }
}

/// Fully wired client state over a fake backend
pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub session: Arc<SessionStore>,
    pub conversations: Arc<ConversationStore>,
    pub coordinator: Arc<ChatCoordinator>,
}

impl Harness {
    pub fn new(mode: ChatMode) -> Self {
        Self::with_backend(FakeBackend::new(), mode)
    }

    pub fn with_backend(backend: Arc<FakeBackend>, mode: ChatMode) -> Self {
        let dyn_backend: Arc<dyn ChatBackend> = backend.clone();
        let session = Arc::new(SessionStore::new(Arc::clone(&dyn_backend)));
        let conversations = Arc::new(ConversationStore::new(
            Arc::clone(&dyn_backend),
            Arc::clone(&session),
        ));
        let coordinator = Arc::new(ChatCoordinator::new(
            dyn_backend,
            Arc::clone(&session),
            Arc::clone(&conversations),
            mode,
        ));

        Self {
            backend,
            session,
            conversations,
            coordinator,
        }
    }

    /// Signed in as `alice` with one fresh conversation open
    pub async fn signed_in(mode: ChatMode) -> Self {
        let harness = Self::new(mode);
        harness.session.login("alice", "pw").await.unwrap();
        harness.conversations.create_new_chat();
        harness
    }

    /// Signed in as `alice`, conversation list not loaded yet
    pub async fn signed_in_without_chat() -> Self {
        let harness = Self::new(ChatMode::Threaded);
        harness.session.login("alice", "pw").await.unwrap();
        harness
    }
}
