use async_trait::async_trait;
use parley_types::{
    ChatResponse, CheckAuthResponse, DeleteThreadResponse, HealthResponse, LoginResponse,
    QueryResponse, ThreadHistory, UserThreadsResponse,
};

use crate::error::Result;

/// Everything the client needs from the chat backend.
///
/// Session credentials travel implicitly (cookies); implementations keep
/// whatever transport state that needs. Calls that require a session return
/// [`crate::ClientError::Unauthorized`] when the backend answers 401.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `GET /check-auth`
    async fn check_auth(&self) -> Result<CheckAuthResponse>;

    /// `POST /login`; a body whose `status` is not `"success"` is an error
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse>;

    /// `POST /register`; does not start a session
    async fn register(&self, email: &str, username: &str, password: &str) -> Result<()>;

    /// `POST /logout`
    async fn logout(&self) -> Result<()>;

    /// `GET /user_threads`
    async fn user_threads(&self) -> Result<UserThreadsResponse>;

    /// `POST /thread_history`
    async fn thread_history(&self, thread_id: &str) -> Result<ThreadHistory>;

    /// `POST /delete_thread`
    async fn delete_thread(&self, thread_id: &str) -> Result<DeleteThreadResponse>;

    /// `POST /query`
    async fn query(&self, question: &str, thread_id: &str) -> Result<QueryResponse>;

    /// `POST /chat`, the threadless single-shot endpoint
    async fn chat(&self, message: &str) -> Result<ChatResponse>;

    /// `GET /health`
    async fn health(&self) -> Result<HealthResponse>;
}
