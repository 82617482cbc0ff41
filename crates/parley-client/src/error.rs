use parley_types::ErrorPayload;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The backend answered 401 on a call that needs a live session
    #[error("Session expired or not authenticated")]
    Unauthorized,

    #[error("Backend rejected request ({status}): {payload}")]
    Api { status: u16, payload: ErrorPayload },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }

    /// Backend error body, if the failure carried one
    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            ClientError::Api { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
