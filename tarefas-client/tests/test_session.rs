mod common;

use common::*;
use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tarefas_client::{
    ApiError, ApiRequest, ApiResponse, FileSessionStore, LoginRequest, SessionManager, SessionStore, StoredSession,
    Transport, TransportError,
};
use tarefas_core::{Clock, FixedClock};

fn alice() -> LoginRequest {
    LoginRequest {
        username: "alice".into(),
        senha: "x".into(),
    }
}

fn login_ok(req: &ApiRequest) -> Result<ApiResponse, TransportError> {
    match route(req) {
        (Method::POST, "/auth/login") => json(
            200,
            json!({"token":"abc","type":"Bearer","username":"alice","expiresIn":3600000}),
        ),
        _ => empty(404),
    }
}

#[tokio::test]
async fn login_stores_session_and_builds_header() {
    let h = harness_with(StoredSession::default(), login_ok);
    assert!(!h.client.session.is_authenticated());

    let session = h.client.session.login(&alice()).await.unwrap();
    assert_eq!(session.expires_at_ms, NOW_MS + 3_600_000);

    assert!(h.client.session.is_authenticated());
    assert_eq!(
        h.client.session.authorization_header_value().as_deref(),
        Some("Bearer abc")
    );
    assert_eq!(h.client.session.current_username().as_deref(), Some("alice"));

    let sent = h.transport.last();
    assert!(sent.header(AUTHORIZATION.as_str()).is_none());
    let body = sent.body.unwrap();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["senha"], "x");
}

#[tokio::test]
async fn subscribers_follow_login_and_logout() {
    let h = harness_with(StoredSession::default(), login_ok);
    let flags = Arc::new(Mutex::new(Vec::new()));
    let names = Arc::new(Mutex::new(Vec::new()));

    let f = flags.clone();
    let _auth = h
        .client
        .session
        .subscribe_authenticated(move |v| f.lock().unwrap().push(*v));
    let n = names.clone();
    let _user = h
        .client
        .session
        .subscribe_username(move |v| n.lock().unwrap().push(v.clone()));

    h.client.session.login(&alice()).await.unwrap();
    h.client.session.logout();

    assert_eq!(*flags.lock().unwrap(), vec![false, true, false]);
    assert_eq!(
        *names.lock().unwrap(),
        vec![None, Some("alice".to_string()), None]
    );
}

#[tokio::test]
async fn existing_session_is_restored_at_startup() {
    let h = logged_in(|_| empty(404));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    let _sub = h
        .client
        .session
        .subscribe_authenticated(move |v| s.lock().unwrap().push(*v));
    assert_eq!(*seen.lock().unwrap(), vec![true]);
    assert_eq!(h.client.session.current_username().as_deref(), Some("alice"));
}

#[tokio::test]
async fn login_failures_keep_logged_out_state() {
    let h = harness_with(StoredSession::default(), |_| empty(401));
    let err = h.client.session.login(&alice()).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::InvalidCredentials("Credenciais inválidas ou token expirado".into())
    );
    assert!(!h.client.session.is_authenticated());

    let h = harness_with(StoredSession::default(), |_| {
        json(400, json!({"message": "Usuário bloqueado"}))
    });
    let err = h.client.session.login(&alice()).await.unwrap_err();
    assert_eq!(err.to_string(), "Usuário bloqueado");

    let h = harness_with(StoredSession::default(), |_| {
        Err(TransportError("connection refused".into()))
    });
    let err = h.client.session.login(&alice()).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn expired_session_is_cleared_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileSessionStore::new(&path);
    store.save(&valid_session(NOW_MS)).unwrap();

    let clock = Arc::new(FixedClock::new(NOW_MS));
    let transport: Arc<dyn Transport> = FakeTransport::new(|_| empty(500));
    let mgr = SessionManager::new(
        store,
        clock.clone() as Arc<dyn Clock>,
        transport,
        endpoints().login(),
    );
    assert!(mgr.is_authenticated());
    assert!(path.exists());

    clock.advance(3_600_001);
    assert!(path.exists());
    assert!(!mgr.is_authenticated());
    assert!(!path.exists());
    assert_eq!(mgr.authorization_header_value(), None);
    assert_eq!(mgr.current_username(), None);
}

#[tokio::test]
async fn invalidate_only_matches_the_current_token() {
    let h = logged_in(|_| empty(404));
    assert!(!h.client.session.invalidate("stale"));
    assert!(h.client.session.is_authenticated());

    assert!(h.client.session.invalidate("abc"));
    assert!(!h.client.session.is_authenticated());
    assert!(!h.client.session.invalidate("abc"));
}

#[tokio::test]
async fn empty_scheme_gives_no_header() {
    let mut stored = valid_session(NOW_MS);
    stored.auth_type = Some(String::new());
    let h = harness_with(stored, |_| empty(404));
    assert!(h.client.session.is_authenticated());
    assert_eq!(h.client.session.authorization_header_value(), None);
}

#[tokio::test]
async fn huge_expiry_saturates_instead_of_overflowing() {
    let h = harness_with(StoredSession::default(), |_| {
        json(
            200,
            json!({"token":"abc","type":"Bearer","username":"alice","expiresIn":i64::MAX}),
        )
    });
    let session = h.client.session.login(&alice()).await.unwrap();
    assert_eq!(session.expires_at_ms, i64::MAX);

    h.clock.advance(365 * 24 * 3_600_000);
    assert!(h.client.session.is_authenticated());
}
