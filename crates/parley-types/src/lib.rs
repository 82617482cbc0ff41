pub mod conversation;
pub mod history;
pub mod message;
pub mod sanitize;
pub mod session;
pub mod wire;

pub use conversation::{greeting, Conversation, DEFAULT_CONVERSATION_NAME};
pub use history::reconstruct_history;
pub use message::{format_time, Message, Sender};
pub use sanitize::to_plain_text;
pub use session::Session;
pub use wire::{
    ChatRequest, ChatResponse, CheckAuthResponse, DeleteThreadResponse, ErrorPayload,
    HealthResponse, LoginRequest, LoginResponse, QueryRequest, QueryResponse, RegisterRequest,
    ThreadHistory, ThreadInfo, ThreadRef, UserThreadsResponse,
};
