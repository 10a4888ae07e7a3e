mod common;

use common::*;
use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde_json::json;
use tarefas_client::{ApiError, CreateUserRequest, LoginRequest, StoredSession};

fn new_user() -> CreateUserRequest {
    CreateUserRequest {
        nome: "Bob".into(),
        email: "bob@example.com".into(),
        username: "bob".into(),
        senha: "segredo".into(),
    }
}

#[tokio::test]
async fn authorized_calls_carry_the_session_header() {
    let h = logged_in(|_| json(200, json!(["BAIXA", "ALTA"])));
    h.client.tasks.list_priorities().await.unwrap();

    let sent = h.transport.last();
    assert_eq!(sent.header(AUTHORIZATION.as_str()), Some("Bearer abc"));
}

#[tokio::test]
async fn public_endpoints_never_carry_the_header() {
    let h = logged_in(|req| match route(req) {
        (Method::POST, "/api/usuarios/criar") => json(
            201,
            json!({"id": 2, "nome": "Bob", "email": "bob@example.com", "username": "bob", "ativo": true}),
        ),
        _ => empty(404),
    });
    let user = h.client.users.create(&new_user()).await.unwrap();
    assert_eq!(user.username, "bob");
    assert!(h.transport.last().header(AUTHORIZATION.as_str()).is_none());
}

#[tokio::test]
async fn without_session_requests_go_out_unmodified() {
    let h = harness_with(StoredSession::default(), |_| json(200, json!([])));
    let tasks = h.client.tasks.list().await.unwrap();
    assert!(tasks.is_empty());

    assert_eq!(h.transport.count(), 1);
    assert!(h.transport.last().header(AUTHORIZATION.as_str()).is_none());
    assert_eq!(h.navigator.redirects(), 0);
}

#[tokio::test]
async fn unauthorized_response_logs_out_once() {
    let h = logged_in(|_| empty(401));

    let (a, b) = tokio::join!(h.client.tasks.list(), h.client.tasks.list_statuses());

    let expected = ApiError::Unauthorized("Não autorizado - Token inválido ou expirado".into());
    assert_eq!(a.unwrap_err(), expected);
    assert_eq!(b.unwrap_err(), expected);

    assert_eq!(h.transport.count(), 2);
    assert_eq!(h.navigator.redirects(), 1);
    assert!(!h.client.session.is_authenticated());
}

#[tokio::test]
async fn stale_token_does_not_clear_a_newer_session() {
    let h = logged_in(|req| match route(req) {
        (Method::POST, "/auth/login") => json(
            200,
            json!({"token":"def","type":"Bearer","username":"alice","expiresIn":3600000}),
        ),
        _ => empty(401),
    });
    assert!(h.client.tasks.list().await.is_err());
    assert_eq!(h.navigator.redirects(), 1);

    h.client
        .session
        .login(&LoginRequest {
            username: "alice".into(),
            senha: "x".into(),
        })
        .await
        .unwrap();
    assert!(!h.client.session.invalidate("abc"));
    assert_eq!(
        h.client.session.authorization_header_value().as_deref(),
        Some("Bearer def")
    );
}

#[tokio::test]
async fn other_failures_leave_the_session_alone() {
    let h = logged_in(|_| empty(403));
    let err = h.client.tasks.list().await.unwrap_err();
    assert_eq!(err, ApiError::Forbidden("Acesso negado".into()));
    assert!(h.client.session.is_authenticated());
    assert_eq!(h.navigator.redirects(), 0);
}

#[tokio::test]
async fn duplicate_user_maps_to_conflict() {
    let h = harness_with(StoredSession::default(), |_| empty(409));
    let err = h.client.users.create(&new_user()).await.unwrap_err();
    assert_eq!(err.to_string(), "Email ou nome de usuário já existem.");
}

#[tokio::test]
async fn empty_created_response_still_counts_as_success() {
    let h = harness_with(StoredSession::default(), |_| empty(201));
    let user = h.client.users.create(&new_user()).await.unwrap();
    assert_eq!(user.username, "bob");
    assert_eq!(user.nome, "Bob");
    assert!(user.id.is_none());
}
