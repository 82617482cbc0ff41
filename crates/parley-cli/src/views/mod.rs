mod chat;
mod helper;
mod login;

pub use chat::ChatView;
pub use helper::{new_editor, LineEditor};
pub use login::LoginView;

use parley_core::Route;

/// How a view hands control back to the main loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewExit {
    Navigate(Route),
    Logout,
    Quit,
}
