use crate::session::SessionStore;

pub const MISSING_CREDENTIALS: &str = "Please enter username and password";
pub const MISSING_EMAIL: &str = "Please enter email for signup";
pub const ACCOUNT_CREATED: &str = "Account created! Please log in.";
const LOGIN_FAILED: &str = "Login failed. Please try again.";
const SIGNUP_FAILED: &str = "Signup failed. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Validation failed; nothing was sent
    Invalid,
    LoggedIn(String),
    /// Account created, form switched back to login mode
    Registered,
    /// Backend rejected the request; `error` holds the message
    Failed,
}

/// Login/signup form state.
///
/// `error` doubles as the notice line, which is how the signup success
/// message reaches the user.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub email: String,
    pub is_signup: bool,
    pub error: String,
    pub is_loading: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_signup(&mut self) {
        self.is_signup = !self.is_signup;
        self.error.clear();
        self.username.clear();
        self.password.clear();
        self.email.clear();
    }

    pub async fn submit(&mut self, session: &SessionStore) -> FormOutcome {
        if self.username.trim().is_empty() || self.password.trim().is_empty() {
            self.error = MISSING_CREDENTIALS.to_string();
            return FormOutcome::Invalid;
        }
        if self.is_signup && self.email.trim().is_empty() {
            self.error = MISSING_EMAIL.to_string();
            return FormOutcome::Invalid;
        }

        self.error.clear();
        self.is_loading = true;

        let outcome = if self.is_signup {
            match session.register(&self.email, &self.username, &self.password).await {
                Ok(()) => {
                    self.is_signup = false;
                    self.password.clear();
                    self.error = ACCOUNT_CREATED.to_string();
                    FormOutcome::Registered
                }
                Err(e) => {
                    self.error = e
                        .payload()
                        .map(|p| p.display_message(SIGNUP_FAILED).to_string())
                        .unwrap_or_else(|| SIGNUP_FAILED.to_string());
                    FormOutcome::Failed
                }
            }
        } else {
            match session.login(&self.username, &self.password).await {
                Ok(_) => {
                    let user = session
                        .current_user()
                        .unwrap_or_else(|| self.username.clone());
                    FormOutcome::LoggedIn(user)
                }
                Err(e) => {
                    self.error = e
                        .payload()
                        .map(|p| p.display_message(LOGIN_FAILED).to_string())
                        .unwrap_or_else(|| LOGIN_FAILED.to_string());
                    FormOutcome::Failed
                }
            }
        };

        self.is_loading = false;
        outcome
    }
}
