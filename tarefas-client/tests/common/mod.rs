//! In-memory transport and wiring shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tarefas_client::{
    ApiRequest, ApiResponse, Client, Endpoints, MemorySessionStore, Navigator, StoredSession,
    Transport, TransportError,
};
use tarefas_core::{Clock, FixedClock};

pub const BASE: &str = "http://api.test";

/// 2026-03-01T12:00:00Z
pub const NOW_MS: i64 = 1_772_366_400_000;

pub fn endpoints() -> Endpoints {
    Endpoints::new(BASE, "/auth/login", "/api/usuarios", "/api/tarefas")
}

type Handler = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync>;

pub struct FakeTransport {
    handler: Handler,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> ApiRequest {
        self.requests().last().cloned().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let resp = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        resp
    }
}

pub fn json(status: u16, body: serde_json::Value) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(
        StatusCode::from_u16(status).unwrap(),
        body.to_string(),
    ))
}

pub fn empty(status: u16) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(StatusCode::from_u16(status).unwrap(), ""))
}

pub fn path(req: &ApiRequest) -> &str {
    req.url.strip_prefix(BASE).unwrap_or(&req.url)
}

pub fn route(req: &ApiRequest) -> (Method, &str) {
    (req.method.clone(), path(req))
}

#[derive(Default)]
pub struct CountingNavigator {
    redirects: AtomicUsize,
}

impl CountingNavigator {
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub client: Client,
    pub transport: Arc<FakeTransport>,
    pub navigator: Arc<CountingNavigator>,
    pub clock: Arc<FixedClock>,
}

pub fn valid_session(now_ms: i64) -> StoredSession {
    StoredSession {
        auth_token: Some("abc".into()),
        auth_type: Some("Bearer".into()),
        auth_username: Some("alice".into()),
        auth_expires: Some(now_ms + 3_600_000),
    }
}

pub fn harness_with<F>(stored: StoredSession, handler: F) -> Harness
where
    F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
{
    let transport = FakeTransport::new(handler);
    let navigator = Arc::new(CountingNavigator::default());
    let clock = Arc::new(FixedClock::new(NOW_MS));
    let client = Client::new(
        transport.clone(),
        MemorySessionStore::with(stored),
        clock.clone() as Arc<dyn Clock>,
        navigator.clone(),
        endpoints(),
    );
    Harness {
        client,
        transport,
        navigator,
        clock,
    }
}

/// Logged in as alice, token "abc", one hour left.
pub fn logged_in<F>(handler: F) -> Harness
where
    F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
{
    harness_with(valid_session(NOW_MS), handler)
}

pub fn task_json(id: u64, titulo: &str, prioridade: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "titulo": titulo,
        "descricao": format!("descrição de {titulo}"),
        "responsavel": "alice",
        "prioridade": prioridade,
        "deadline": "2026-04-01",
        "status": status,
        "criadoEm": "2026-02-01T09:00:00Z"
    })
}
