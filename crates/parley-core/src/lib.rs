pub mod coordinator;
pub mod conversations;
pub mod error;
pub mod login;
pub mod router;
pub mod session;

pub use coordinator::{ChatCoordinator, ChatMode, SendOutcome, FAILURE_TEXT, SESSION_EXPIRED_TEXT};
pub use conversations::{Confirm, ConversationState, ConversationStore, DeleteOutcome};
pub use error::{CoreError, Result};
pub use login::{FormOutcome, LoginForm, ACCOUNT_CREATED, MISSING_CREDENTIALS, MISSING_EMAIL};
pub use router::{AuthGuard, Guard, Route, Router, Transition};
pub use session::SessionStore;

// Re-export the pieces callers need to wire a client together
pub use parley_client::{ChatBackend, ClientError, HttpBackend};
pub use parley_types::{Conversation, Message, Sender, Session};
