mod common;

use std::sync::Arc;

use auraread_core::domain::{Credentials, Registration};
use auraread_core::ports::{PortError, SessionStorage};
use common::{MockServer, PASSWORD, TOKEN};
use reader_lib::adapters::FileSessionStorage;
use reader_lib::app::AppStore;

fn credentials(password: &str) -> Credentials {
    Credentials {
        username: "ada".to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn login_stores_the_session() {
    let server = MockServer::start().await;
    let (mut store, storage) = server.store();
    assert!(!store.auth.is_authenticated());

    let user = store.login(&credentials(PASSWORD)).await.unwrap();

    assert_eq!(user.username, "ada");
    assert!(store.auth.is_authenticated());
    assert_eq!(storage.get_item("token").unwrap().as_deref(), Some(TOKEN));
    let stored_user: serde_json::Value =
        serde_json::from_str(&storage.get_item("user").unwrap().unwrap()).unwrap();
    assert_eq!(stored_user["username"], "ada");
    assert_eq!(stored_user["email"], "ada@example.com");
}

#[tokio::test]
async fn login_does_not_send_a_stale_token() {
    let server = MockServer::start().await;
    let (mut store, storage) = server.store();
    storage.set_item("token", "stale").unwrap();

    store.login(&credentials(PASSWORD)).await.unwrap();

    let backend = server.backend();
    assert_eq!(backend.requests[0].path, "/api/login/");
    assert_eq!(backend.requests[0].authorization, None);
}

#[tokio::test]
async fn invalid_login_leaves_storage_untouched() {
    let server = MockServer::start().await;
    let (mut store, storage) = server.store();

    let err = store.login(&credentials("wrong")).await.unwrap_err();

    assert_eq!(err, PortError::Unauthorized("Invalid credentials".to_string()));
    assert_eq!(store.auth.error.as_deref(), Some("Invalid credentials"));
    assert!(!store.auth.is_authenticated());
    assert_eq!(storage.get_item("token").unwrap(), None);
    assert_eq!(storage.get_item("user").unwrap(), None);
}

#[tokio::test]
async fn rejected_login_keeps_an_existing_session() {
    let server = MockServer::start().await;
    let (mut store, storage) = server.logged_in_store();
    let stored_user = storage.get_item("user").unwrap();

    let err = store.login(&credentials("wrong")).await.unwrap_err();

    assert_eq!(err, PortError::Unauthorized("Invalid credentials".to_string()));
    assert_eq!(store.auth.error.as_deref(), Some("Invalid credentials"));
    assert!(store.auth.is_authenticated());
    assert_eq!(storage.get_item("token").unwrap().as_deref(), Some(TOKEN));
    assert_eq!(storage.get_item("user").unwrap(), stored_user);
}

#[tokio::test]
async fn register_logs_in_and_reports_field_errors() {
    let server = MockServer::start().await;
    let (mut store, storage) = server.store();

    let err = store
        .register(&Registration {
            username: "taken".to_string(),
            password: PASSWORD.to_string(),
            email: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.message(), "username: A user with that username already exists.");
    assert_eq!(storage.get_item("token").unwrap(), None);

    let user = store
        .register(&Registration {
            username: "grace".to_string(),
            password: PASSWORD.to_string(),
            email: Some("grace@example.com".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(user.username, "grace");
    assert!(store.auth.is_authenticated());
    assert_eq!(storage.get_item("token").unwrap().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn session_survives_a_restart_through_the_state_file() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let storage: Arc<dyn SessionStorage> = Arc::new(FileSessionStorage::new(dir.path()));
    let mut store = AppStore::new(server.app_state(storage));
    store.login(&credentials(PASSWORD)).await.unwrap();

    let reopened: Arc<dyn SessionStorage> = Arc::new(FileSessionStorage::new(dir.path()));
    let mut restored = AppStore::new(server.app_state(reopened));
    assert!(restored.auth.is_authenticated());
    assert_eq!(restored.auth.user.as_ref().unwrap().username, "ada");

    let me = restored.load_current_user().await.unwrap();
    assert_eq!(me.id, 1);
}

#[tokio::test]
async fn logout_clears_storage() {
    let server = MockServer::start().await;
    let (mut store, storage) = server.logged_in_store();

    store.logout().await.unwrap();

    assert!(!store.auth.is_authenticated());
    assert_eq!(storage.get_item("token").unwrap(), None);
    assert_eq!(storage.get_item("user").unwrap(), None);
    assert_eq!(server.backend().count("POST", "/api/logout/"), 1);
}

#[tokio::test]
async fn logout_clears_storage_even_when_the_server_refuses() {
    let server = MockServer::start().await;
    let (mut store, storage) = server.logged_in_store();
    server.backend().reject_tokens = true;

    assert!(store.logout().await.is_err());

    assert!(!store.auth.is_authenticated());
    assert_eq!(storage.get_item("token").unwrap(), None);
}

#[tokio::test]
async fn rejected_token_forces_logout() {
    let server = MockServer::start().await;
    let (mut store, storage) = server.logged_in_store();
    server.backend().reject_tokens = true;

    let err = store.fetch_documents().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!store.auth.is_authenticated());
    assert_eq!(store.documents.error.as_deref(), Some("Invalid token."));
    assert_eq!(storage.get_item("token").unwrap(), None);
    assert_eq!(storage.get_item("user").unwrap(), None);
}

#[tokio::test]
async fn failing_current_user_ends_the_session() {
    let server = MockServer::start().await;
    let (mut store, storage) = server.logged_in_store();
    server.backend().reject_tokens = true;

    assert!(store.load_current_user().await.is_err());

    assert!(!store.auth.is_authenticated());
    assert_eq!(store.auth.error.as_deref(), Some("Invalid token."));
    assert_eq!(storage.get_item("token").unwrap(), None);
}
