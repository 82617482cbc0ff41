use std::sync::Arc;

use tokio::sync::watch;

use crate::session::SessionStore;

/// Top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Chat,
}

impl Route {
    pub fn requires_auth(self) -> bool {
        matches!(self, Route::Chat)
    }

    pub fn name(self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::Chat => "chat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Allow(Route),
    Redirect(Route),
}

impl Transition {
    /// Where navigation actually lands
    pub fn destination(self) -> Route {
        match self {
            Transition::Allow(route) | Transition::Redirect(route) => route,
        }
    }
}

/// Decides whether a navigation may complete
pub trait Guard: Send + Sync {
    fn check(&self, target: Route) -> Transition;
}

/// Gate on the cached session flag.
///
/// No network call is made, so a session that died server-side passes until
/// some request comes back 401 and clears the store.
pub struct AuthGuard {
    session: Arc<SessionStore>,
}

impl AuthGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }
}

impl Guard for AuthGuard {
    fn check(&self, target: Route) -> Transition {
        let authenticated = self.session.is_authenticated();
        match target {
            route if route.requires_auth() && !authenticated => Transition::Redirect(Route::Login),
            // Signed-in users skip the login view
            Route::Login if authenticated => Transition::Redirect(Route::Chat),
            route => Transition::Allow(route),
        }
    }
}

pub struct Router {
    session: Arc<SessionStore>,
    guard: Box<dyn Guard>,
    current: watch::Sender<Route>,
}

impl Router {
    pub fn new(session: Arc<SessionStore>) -> Self {
        let guard = Box::new(AuthGuard::new(Arc::clone(&session)));
        Self::with_guard(session, guard)
    }

    pub fn with_guard(session: Arc<SessionStore>, guard: Box<dyn Guard>) -> Self {
        let (current, _) = watch::channel(Route::Login);
        Self {
            session,
            guard,
            current,
        }
    }

    /// Run the start-up auth check once and land on the right view
    pub async fn bootstrap(&self) -> Route {
        let session = self.session.check_auth().await;
        let target = if session.is_authenticated() {
            Route::Chat
        } else {
            Route::Login
        };
        self.navigate(target)
    }

    pub fn navigate(&self, target: Route) -> Route {
        let transition = self.guard.check(target);
        if let Transition::Redirect(to) = transition {
            tracing::debug!(from = target.name(), to = to.name(), "Navigation redirected");
        }

        let destination = transition.destination();
        self.current.send_replace(destination);
        destination
    }

    /// Sign out and return to the login view
    pub async fn logout(&self) -> Route {
        self.session.logout().await;
        self.navigate(Route::Login)
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}
