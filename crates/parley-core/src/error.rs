use parley_client::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Backend refused to delete thread: {0}")]
    DeleteRejected(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl CoreError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Client(e) if e.is_unauthorized())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
