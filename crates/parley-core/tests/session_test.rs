mod common;

use std::sync::atomic::Ordering;

use common::{FakeBackend, Harness};
use parley_core::{ChatMode, Session, SessionStore};
use parley_types::ErrorPayload;

#[tokio::test]
async fn test_check_auth_adopts_backend_session() {
    let backend = FakeBackend::new();
    *backend.signed_in_as.lock().unwrap() = Some("alice".to_string());
    let harness = Harness::with_backend(backend, ChatMode::Threaded);

    let session = harness.session.check_auth().await;

    assert_eq!(session, Session::authenticated("alice"));
    assert!(harness.session.is_authenticated());
    assert_eq!(harness.session.current_user().as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_check_auth_fails_open() {
    let harness = Harness::new(ChatMode::Threaded);
    harness.session.login("alice", "pw").await.unwrap();
    harness.backend.check_auth_fails.store(true, Ordering::SeqCst);

    let session = harness.session.check_auth().await;

    assert_eq!(session, Session::anonymous());
    assert!(!harness.session.is_authenticated());
    assert_eq!(harness.session.current_user(), None);
}

#[tokio::test]
async fn test_login_rejection_leaves_state() {
    let harness = Harness::new(ChatMode::Threaded);
    *harness.backend.login_rejection.lock().unwrap() =
        Some(ErrorPayload::from_message("Invalid credentials"));

    let err = harness.session.login("alice", "bad").await.unwrap_err();

    assert_eq!(
        err.payload().map(|p| p.display_message("").to_string()),
        Some("Invalid credentials".to_string())
    );
    assert!(!harness.session.is_authenticated());
}

#[tokio::test]
async fn test_register_does_not_sign_in() {
    let harness = Harness::new(ChatMode::Threaded);

    harness.session.register("a@b.c", "alice", "pw").await.unwrap();

    assert!(!harness.session.is_authenticated());
    assert_eq!(harness.backend.count("register"), 1);
}

#[tokio::test]
async fn test_logout_clears_even_when_backend_fails() {
    let harness = Harness::new(ChatMode::Threaded);
    harness.session.login("alice", "pw").await.unwrap();
    harness.backend.logout_fails.store(true, Ordering::SeqCst);

    harness.session.logout().await;

    assert!(!harness.session.is_authenticated());
    assert_eq!(harness.session.current_user(), None);
}

#[tokio::test]
async fn test_readers_make_no_calls() {
    let backend = FakeBackend::new();
    let store = SessionStore::new(backend.clone());

    assert!(!store.is_authenticated());
    assert_eq!(store.current_user(), None);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_subscribers_see_login_and_invalidate() {
    let harness = Harness::new(ChatMode::Threaded);
    let mut rx = harness.session.subscribe();

    harness.session.login("alice", "pw").await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_authenticated());

    harness.session.invalidate();
    assert!(rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().is_authenticated());

    // Already anonymous: nothing to publish
    harness.session.invalidate();
    assert!(!rx.has_changed().unwrap());
}
