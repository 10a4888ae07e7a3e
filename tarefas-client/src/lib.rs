//! tarefas-client: session management and typed access to the Tarefas API.

pub mod authorizer;
pub mod board;
pub mod endpoints;
pub mod error;
pub mod loader;
pub mod models;
pub mod services;
pub mod session;
pub mod transport;

use std::sync::Arc;
use tarefas_core::Clock;

pub use authorizer::{Navigator, RequestAuthorizer};
pub use board::TaskBoard;
pub use endpoints::Endpoints;
pub use error::{ApiError, ApiResult, ErrorContext};
pub use loader::{InitialData, load_initial_data};
pub use models::{CreateUserRequest, NewTask, TaskPatch, TaskPayload, UserPayload};
pub use services::{TaskService, UserService};
pub use session::{
    FileSessionStore, LoginRequest, LoginResponse, MemorySessionStore, Session, SessionManager,
    SessionStore, StoredSession,
};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport, TransportError};

/// Fully wired client: one session manager, and services whose requests
/// all pass through a [`RequestAuthorizer`].
pub struct Client {
    pub session: Arc<SessionManager>,
    pub tasks: TaskService,
    pub users: UserService,
}

impl Client {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: impl SessionStore + 'static,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
        endpoints: Endpoints,
    ) -> Self {
        let session = Arc::new(SessionManager::new(
            store,
            clock.clone(),
            transport.clone(),
            endpoints.login(),
        ));
        let authorized: Arc<dyn Transport> = Arc::new(RequestAuthorizer::new(
            transport,
            session.clone(),
            navigator,
            endpoints.clone(),
        ));
        Self {
            session,
            tasks: TaskService::new(authorized.clone(), endpoints.clone(), clock),
            users: UserService::new(authorized, endpoints),
        }
    }

    pub fn board(&self, timezone: impl Into<String>) -> TaskBoard {
        TaskBoard::new(self.tasks.clone(), timezone)
    }
}
