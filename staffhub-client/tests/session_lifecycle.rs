//! End-to-end session lifecycle against the mock backend.

mod common;

use client::{
    ClientError, FileTokenStore, MemoryNavigator, MemoryTokenStore, NavigationKind, Route,
    SessionError, TokenStore, guard::landing_route, navigation::navigation_for,
};
use common::{
    COLLABORATOR_EMAIL, MANAGER_EMAIL, MockBackend, SLOW_REJECTED_TOKEN, credentials,
};
use futures::future::join_all;
use shared::models::{LoginCredentials, UserRole};
use std::{
    sync::{Arc, atomic::Ordering},
    time::Duration,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_restore_without_stored_token() {
    let backend = MockBackend::start().await;
    let store = backend.session_store(
        Arc::new(MemoryTokenStore::new()),
        Arc::new(MemoryNavigator::new()),
    );

    assert!(store.is_loading());
    assert!(store.restore().await.is_none());

    let state = store.ready().await;
    assert!(!state.loading);
    assert!(!state.is_authenticated());
    assert_eq!(landing_route(&state), Some(Route::Login));
    assert_eq!(backend.state.protected_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_restore_with_accepted_token() {
    let backend = MockBackend::start().await;
    let token = backend.state.issue_token(COLLABORATOR_EMAIL);
    let tokens = Arc::new(MemoryTokenStore::with_token(token.clone()));
    let store = backend.session_store(tokens.clone(), Arc::new(MemoryNavigator::new()));

    let user = store.restore().await.expect("session restored");

    assert_eq!(user.email, COLLABORATOR_EMAIL);
    assert_eq!(store.user(), Some(user));
    assert!(!store.is_privileged());
    assert_eq!(store.api().token(), Some(token.clone()));
    assert_eq!(tokens.peek(), Some(token));
    assert_eq!(landing_route(&store.snapshot()), Some(Route::Dashboard));
}

#[tokio::test]
async fn test_restore_with_rejected_token() {
    let backend = MockBackend::start().await;
    let tokens = Arc::new(MemoryTokenStore::with_token("forged-token"));
    let store = backend.session_store(tokens.clone(), Arc::new(MemoryNavigator::new()));

    assert!(store.restore().await.is_none());

    assert!(!store.is_loading());
    assert!(!store.is_authenticated());
    assert_eq!(tokens.peek(), None);
    assert!(!store.api().has_token());
}

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let backend = MockBackend::start().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(MemoryNavigator::at(Route::Login));
    let store = backend.session_store(tokens.clone(), navigator.clone());
    store.restore().await;

    let user = store
        .login(&credentials(COLLABORATOR_EMAIL))
        .await
        .expect("login succeeds");

    assert_eq!(user.role, UserRole::Normal);
    assert!(store.is_authenticated());
    assert!(!store.is_loading());
    let stored = tokens.peek().expect("token persisted");
    assert!(backend.state.active_tokens().contains(&stored));
    assert_eq!(store.api().token(), Some(stored));
    assert_eq!(navigator.history(), vec![(NavigationKind::Push, Route::Dashboard)]);
}

#[tokio::test]
async fn test_login_with_invalid_credentials() {
    let backend = MockBackend::start().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(MemoryNavigator::at(Route::Login));
    let store = backend.session_store(tokens.clone(), navigator.clone());
    store.restore().await;

    let err = store
        .login(&LoginCredentials::new(MANAGER_EMAIL, "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Rejected { .. }));
    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(!store.is_authenticated());
    assert!(!store.is_loading());
    assert_eq!(tokens.peek(), None);
    assert!(!store.api().has_token());
    assert!(navigator.history().is_empty());
}

#[tokio::test]
async fn test_login_validation_errors_are_joined() {
    let backend = MockBackend::start().await;
    let store = backend.session_store(
        Arc::new(MemoryTokenStore::new()),
        Arc::new(MemoryNavigator::new()),
    );

    let err = store
        .login(&LoginCredentials::new("", ""))
        .await
        .unwrap_err();

    assert_eq!(
        err.user_message(),
        "email is required; password is required"
    );
}

#[tokio::test]
async fn test_failed_login_keeps_previous_session() {
    let backend = MockBackend::start().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let store = backend.session_store(tokens.clone(), Arc::new(MemoryNavigator::new()));
    store.restore().await;
    store.login(&credentials(MANAGER_EMAIL)).await.unwrap();
    let before = store.snapshot();

    store
        .login(&LoginCredentials::new(MANAGER_EMAIL, "nope"))
        .await
        .unwrap_err();

    assert_eq!(store.snapshot(), before);
    assert_eq!(tokens.peek().as_deref(), before.session.as_ref().map(|s| s.token()));
}

#[tokio::test]
async fn test_manager_login_unlocks_privileged_navigation() {
    let backend = MockBackend::start().await;
    let store = backend.session_store(
        Arc::new(MemoryTokenStore::new()),
        Arc::new(MemoryNavigator::at(Route::Login)),
    );
    store.restore().await;

    let user = store.login(&credentials(MANAGER_EMAIL)).await.unwrap();

    assert_eq!(user.email, "admin@empresa.com");
    assert!(store.is_privileged());
    let routes: Vec<Route> = navigation_for(user.role)
        .into_iter()
        .map(|item| item.route)
        .collect();
    assert!(routes.contains(&Route::Reports));
    assert!(store.permissions().create_user);
    assert!(store.permissions().access_reports);
}

#[tokio::test]
async fn test_concurrent_unauthorized_responses_redirect_once() {
    let backend = MockBackend::start().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(MemoryNavigator::at(Route::Login));
    let store = backend.session_store(tokens.clone(), navigator.clone());
    store.restore().await;
    store.login(&credentials(COLLABORATOR_EMAIL)).await.unwrap();

    backend.state.revoke_all();
    let calls = (0..5).map(|_| store.api().list_areas());
    let results = join_all(calls).await;

    assert!(
        results
            .iter()
            .all(|result| matches!(result, Err(ClientError::SessionExpired)))
    );
    assert!(!store.is_authenticated());
    assert_eq!(tokens.peek(), None);
    assert_eq!(navigator.count(NavigationKind::Redirect, Route::Login), 1);
    assert_eq!(backend.state.rejected_calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_unauthorized_on_login_route_does_not_redirect() {
    let backend = MockBackend::start().await;
    let token = backend.state.issue_token(MANAGER_EMAIL);
    let navigator = Arc::new(MemoryNavigator::at(Route::Login));
    let store = backend.session_store(
        Arc::new(MemoryTokenStore::with_token(token)),
        navigator.clone(),
    );
    store.restore().await.expect("restored");

    backend.state.revoke_all();
    let err = store.api().current_user().await.unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired));
    assert!(!store.is_authenticated());
    assert_eq!(navigator.count(NavigationKind::Redirect, Route::Login), 0);
}

#[tokio::test]
async fn test_logout_then_call_fails_preflight() {
    let backend = MockBackend::start().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(MemoryNavigator::new());
    let store = backend.session_store(tokens.clone(), navigator.clone());
    store.restore().await;
    store.login(&credentials(MANAGER_EMAIL)).await.unwrap();
    let calls_before = backend.state.protected_calls.load(Ordering::SeqCst);

    store.logout();
    let err = store.api().list_areas().await.unwrap_err();

    assert!(matches!(err, ClientError::NotAuthenticated));
    assert_eq!(
        backend.state.protected_calls.load(Ordering::SeqCst),
        calls_before
    );
    assert!(!store.is_authenticated());
    assert_eq!(tokens.peek(), None);
    assert_eq!(navigator.count(NavigationKind::Push, Route::Login), 1);
}

#[tokio::test]
async fn test_session_survives_restart_with_file_store() {
    let backend = MockBackend::start().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("staffhub").join("auth_token");

    let first = backend.session_store(
        Arc::new(FileTokenStore::new(&path)),
        Arc::new(MemoryNavigator::new()),
    );
    first.restore().await;
    first.login(&credentials(MANAGER_EMAIL)).await.unwrap();
    assert!(path.exists());

    let second = backend.session_store(
        Arc::new(FileTokenStore::new(&path)),
        Arc::new(MemoryNavigator::new()),
    );
    let user = second.restore().await.expect("restored from disk");
    assert_eq!(user.email, MANAGER_EMAIL);

    second.logout();
    assert_eq!(FileTokenStore::new(&path).load().unwrap(), None);
}

#[tokio::test]
async fn test_subscribers_observe_login_and_logout() {
    let backend = MockBackend::start().await;
    let store = backend.session_store(
        Arc::new(MemoryTokenStore::new()),
        Arc::new(MemoryNavigator::new()),
    );
    let mut receiver = store.subscribe();
    store.restore().await;
    assert!(receiver.has_changed().unwrap());
    assert!(!receiver.borrow_and_update().loading);

    store.login(&credentials(COLLABORATOR_EMAIL)).await.unwrap();
    receiver.changed().await.unwrap();
    assert!(receiver.borrow_and_update().is_authenticated());

    store.logout();
    receiver.changed().await.unwrap();
    assert!(!receiver.borrow().is_authenticated());
}

#[tokio::test]
async fn test_login_during_restore_survives_late_rejection() {
    let backend = MockBackend::start().await;
    let tokens = Arc::new(MemoryTokenStore::with_token(SLOW_REJECTED_TOKEN));
    let navigator = Arc::new(MemoryNavigator::at(Route::Login));
    let store = backend.session_store(tokens.clone(), navigator.clone());

    let (restored, login) = tokio::join!(store.restore(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.login(&credentials(MANAGER_EMAIL)).await
    });

    assert!(restored.is_none());
    let user = login.expect("login succeeds");
    assert_eq!(store.user(), Some(user));
    assert!(!store.is_loading());
    let stored = tokens.peek().expect("new token kept");
    assert_ne!(stored, SLOW_REJECTED_TOKEN);
    assert_eq!(store.api().token(), Some(stored));
    assert_eq!(navigator.count(NavigationKind::Redirect, Route::Login), 0);
}

#[tokio::test]
async fn test_subscribers_observe_loading_during_login() {
    let backend = MockBackend::start().await;
    let store = backend.session_store(
        Arc::new(MemoryTokenStore::new()),
        Arc::new(MemoryNavigator::new()),
    );
    store.restore().await;
    let mut receiver = store.subscribe();
    receiver.mark_unchanged();

    let joao = credentials(COLLABORATOR_EMAIL);
    let (login, loading_seen) = tokio::join!(store.login(&joao), async {
        receiver
            .wait_for(|state| state.loading)
            .await
            .map(|state| state.loading)
    });

    login.unwrap();
    assert!(loading_seen.unwrap());
    let state = store.ready().await;
    assert!(!state.loading);
    assert!(state.is_authenticated());
}
