use std::sync::Arc;

use parley_client::{ChatBackend, Result};
use parley_types::{LoginResponse, Session};
use tokio::sync::watch;

/// Sole owner of authentication state.
///
/// Readers get the cached [`Session`]; only the backend calls here and
/// [`SessionStore::invalidate`] change it. Every change is published to
/// subscribers.
pub struct SessionStore {
    backend: Arc<dyn ChatBackend>,
    state: watch::Sender<Session>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        let (state, _) = watch::channel(Session::anonymous());
        Self { backend, state }
    }

    /// Ask the backend whether the cookie session is live.
    ///
    /// Never fails: any transport or API error leaves the store anonymous.
    pub async fn check_auth(&self) -> Session {
        let session = match self.backend.check_auth().await {
            Ok(resp) => Session::from_parts(resp.authenticated, resp.username),
            Err(e) => {
                tracing::warn!("Auth check failed, treating as signed out: {}", e);
                Session::anonymous()
            }
        };

        tracing::debug!(
            authenticated = session.is_authenticated(),
            "Auth check complete"
        );
        self.state.send_replace(session.clone());
        session
    }

    /// Sign in. On failure the cached session is left untouched and the
    /// backend's error payload is returned.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let response = self.backend.login(username, password).await?;

        let name = response
            .username
            .clone()
            .unwrap_or_else(|| username.to_string());
        tracing::info!(user = %name, "Logged in");
        self.state.send_replace(Session::authenticated(name));

        Ok(response)
    }

    /// Create an account. Does not sign the user in.
    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<()> {
        self.backend.register(email, username, password).await?;
        tracing::info!(user = %username, "Account registered");
        Ok(())
    }

    /// Best-effort sign out; local state is cleared whatever the backend says
    pub async fn logout(&self) {
        if let Err(e) = self.backend.logout().await {
            tracing::warn!("Logout request failed, clearing local session anyway: {}", e);
        }
        self.invalidate();
    }

    /// Drop the cached session without a network call (e.g. after a 401)
    pub fn invalidate(&self) {
        self.state.send_if_modified(|session| {
            if *session == Session::anonymous() {
                return false;
            }
            *session = Session::anonymous();
            true
        });
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn current_user(&self) -> Option<String> {
        self.state.borrow().username().map(str::to_string)
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }
}
