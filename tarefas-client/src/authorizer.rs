//! Request authorizer: the pipeline stage in front of every API call.
//!
//! - login and user registration pass through untouched;
//! - everything else gets `Authorization: {scheme} {token}` when a valid
//!   session exists, and is sent unmodified when none does;
//! - a 401 on an authorized call logs the session out and asks the
//!   [`Navigator`] to show the login view. The 401 response itself is still
//!   returned, so the caller sees the failure.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::endpoints::Endpoints;
use crate::session::SessionManager;
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};

/// Front-end hook for "go to the login view".
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

pub struct RequestAuthorizer {
    inner: Arc<dyn Transport>,
    session: Arc<SessionManager>,
    navigator: Arc<dyn Navigator>,
    endpoints: Endpoints,
}

impl RequestAuthorizer {
    pub fn new(
        inner: Arc<dyn Transport>,
        session: Arc<SessionManager>,
        navigator: Arc<dyn Navigator>,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            inner,
            session,
            navigator,
            endpoints,
        }
    }
}

#[async_trait]
impl Transport for RequestAuthorizer {
    async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, TransportError> {
        if self.endpoints.is_public(&request.url) {
            return self.inner.execute(request).await;
        }

        let Some(session) = self.session.current_session() else {
            debug!(url = %request.url, "no session; sending without Authorization");
            return self.inner.execute(request).await;
        };
        let Some(header) = session
            .authorization_header()
            .and_then(|h| HeaderValue::from_str(&h).ok())
        else {
            warn!(url = %request.url, "session has no usable authorization header");
            return self.inner.execute(request).await;
        };

        request.headers.insert(AUTHORIZATION, header);
        let resp = self.inner.execute(request).await?;

        if resp.status == StatusCode::UNAUTHORIZED && self.session.invalidate(&session.token) {
            warn!("401 from API; session cleared");
            self.navigator.redirect_to_login();
        }
        Ok(resp)
    }
}
