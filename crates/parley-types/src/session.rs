use serde::{Deserialize, Serialize};

/// Cached authentication state of the current user.
///
/// `username` is only ever `Some` while `authenticated` is true; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    authenticated: bool,
    username: Option<String>,
}

impl Session {
    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            username: Some(username.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build from a backend report; a username without authentication is dropped
    pub fn from_parts(authenticated: bool, username: Option<String>) -> Self {
        Self {
            authenticated,
            username: username.filter(|_| authenticated),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_has_no_username() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert_eq!(session.username(), None);
    }

    #[test]
    fn test_authenticated_carries_username() {
        let session = Session::authenticated("alice");
        assert!(session.is_authenticated());
        assert_eq!(session.username(), Some("alice"));
    }

    #[test]
    fn test_from_parts_enforces_invariant() {
        let session = Session::from_parts(false, Some("mallory".to_string()));
        assert_eq!(session, Session::anonymous());

        let session = Session::from_parts(true, None);
        assert!(session.is_authenticated());
        assert_eq!(session.username(), None);
    }
}
