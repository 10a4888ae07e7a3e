//! Typed calls against the Tarefas API.
//!
//! Both services send through whatever [`Transport`] they are given; in the
//! assembled client that is the [`RequestAuthorizer`](crate::RequestAuthorizer).

use std::sync::Arc;
use tarefas_core::{Clock, Priority, Task, TaskStatus};
use tracing::{debug, warn};

use crate::endpoints::Endpoints;
use crate::error::{ApiError, ApiResult, ErrorContext};
use crate::models::{CreateUserRequest, NewTask, TaskPatch, TaskPayload, UserPayload};
use crate::transport::{ApiRequest, ApiResponse, Transport};

async fn send(
    transport: &dyn Transport,
    request: ApiRequest,
    ctx: ErrorContext,
) -> ApiResult<ApiResponse> {
    debug!(method = %request.method, url = %request.url, "api request");
    let resp = transport.execute(request).await.map_err(|e| {
        warn!(error = %e, "transport failure");
        ApiError::from_transport(&e)
    })?;
    if !resp.is_success() {
        let err = ApiError::from_status(ctx, resp.status, &resp.body);
        warn!(status = %resp.status, error = %err, "api error");
        return Err(err);
    }
    Ok(resp)
}

/// Empty bodies (204, or a bare 200) decode as an all-missing payload.
fn payload(resp: &ApiResponse) -> ApiResult<TaskPayload> {
    if resp.body.trim().is_empty() {
        return Ok(TaskPayload::default());
    }
    resp.json()
}

#[derive(Clone)]
pub struct UserService {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
}

impl UserService {
    pub fn new(transport: Arc<dyn Transport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Any 2xx is success. With an empty body the user is echoed back
    /// from the request.
    pub async fn create(&self, user: &CreateUserRequest) -> ApiResult<UserPayload> {
        let req = ApiRequest::post(self.endpoints.create_user()).json(user)?;
        let resp = send(self.transport.as_ref(), req, ErrorContext::UserCreation).await?;
        if resp.body.trim().is_empty() {
            return Ok(UserPayload {
                id: None,
                nome: user.nome.clone(),
                email: user.email.clone(),
                username: user.username.clone(),
                ativo: true,
            });
        }
        resp.json()
    }
}

#[derive(Clone)]
pub struct TaskService {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
    clock: Arc<dyn Clock>,
}

impl TaskService {
    pub fn new(transport: Arc<dyn Transport>, endpoints: Endpoints, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            endpoints,
            clock,
        }
    }

    async fn get(&self, url: String) -> ApiResult<ApiResponse> {
        send(self.transport.as_ref(), ApiRequest::get(url), ErrorContext::Tasks).await
    }

    pub async fn list_priorities(&self) -> ApiResult<Vec<Priority>> {
        let codes: Vec<String> = self.get(self.endpoints.priorities()).await?.json()?;
        Ok(codes.iter().map(|c| Priority::from_backend(c)).collect())
    }

    pub async fn list_statuses(&self) -> ApiResult<Vec<TaskStatus>> {
        let codes: Vec<String> = self.get(self.endpoints.statuses()).await?.json()?;
        Ok(codes.iter().map(|c| TaskStatus::from_backend(c)).collect())
    }

    /// Names of active users, for the owner choice list.
    pub async fn list_owners(&self) -> ApiResult<Vec<String>> {
        let users: Vec<UserPayload> = self.get(self.endpoints.list_users()).await?.json()?;
        Ok(users.into_iter().filter(|u| u.ativo).map(|u| u.nome).collect())
    }

    /// Rows that cannot become a [`Task`] are skipped with a warning.
    pub async fn list(&self) -> ApiResult<Vec<Task>> {
        let payloads: Vec<TaskPayload> = self.get(self.endpoints.list_tasks()).await?.json()?;
        let now = self.clock.now_utc();
        Ok(payloads
            .into_iter()
            .filter_map(|p| {
                let id = p.id;
                p.into_task(None, now)
                    .map_err(|e| warn!(id = ?id, error = %e, "skipping task"))
                    .ok()
            })
            .collect())
    }

    pub async fn get_task(&self, id: u64) -> ApiResult<Task> {
        let resp = self.get(self.endpoints.task(id)).await?;
        payload(&resp)?.into_task(None, self.clock.now_utc())
    }

    pub async fn create(&self, task: &NewTask) -> ApiResult<Task> {
        let req = ApiRequest::post(self.endpoints.create_task()).json(&task.to_body()?)?;
        let resp = send(self.transport.as_ref(), req, ErrorContext::Tasks).await?;
        let now = self.clock.now_utc();
        payload(&resp)?.into_task(Some(&task.as_unsaved(now)), now)
    }

    /// Raw server answer; callers merge it over their cached copy.
    pub async fn update(&self, id: u64, patch: &TaskPatch) -> ApiResult<TaskPayload> {
        let req = ApiRequest::put(self.endpoints.task(id)).json(&patch.to_body(id)?)?;
        let resp = send(self.transport.as_ref(), req, ErrorContext::Tasks).await?;
        payload(&resp)
    }

    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        send(
            self.transport.as_ref(),
            ApiRequest::delete(self.endpoints.task(id)),
            ErrorContext::Tasks,
        )
        .await?;
        Ok(())
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
