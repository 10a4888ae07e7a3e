//! TaskBoard: the task list engine wired to the API.
//!
//! Every mutation goes to the server first; the cached list is then rebuilt
//! from the server's answer (falling back to the previous copy for omitted
//! fields), which recomputes the filtered view with the active criteria and
//! sort. Done tasks are refused locally before any request is made.

use std::sync::Arc;
use tarefas_core::{
    Clock, FilterCriteria, SortColumn, SortState, Task, TaskAction, TaskDraft, TaskList,
    TaskStatus, today_in, validate_new_task, validate_task_edit,
};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::{NewTask, TaskPatch};
use crate::services::TaskService;

pub struct TaskBoard {
    service: TaskService,
    list: TaskList,
    clock: Arc<dyn Clock>,
    timezone: String,
}

impl TaskBoard {
    /// `timezone` (IANA) decides what "today" means for deadline checks.
    pub fn new(service: TaskService, timezone: impl Into<String>) -> Self {
        let clock = service.clock().clone();
        Self {
            service,
            list: TaskList::new(),
            clock,
            timezone: timezone.into(),
        }
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    pub fn view(&self) -> &[Task] {
        self.list.view()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.list.get(id)
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.list.set_criteria(criteria);
    }

    pub fn clear_criteria(&mut self) {
        self.list.clear_criteria();
    }

    pub fn sort_by(&mut self, column: SortColumn) -> SortState {
        self.list.sort_by(column);
        self.list.sort_state()
    }

    pub async fn refresh(&mut self) -> ApiResult<()> {
        let tasks = self.service.list().await?;
        self.list.replace_all(tasks);
        Ok(())
    }

    /// Seed the cache without a round trip (tests, or data loaded elsewhere).
    pub fn load(&mut self, tasks: Vec<Task>) {
        self.list.replace_all(tasks);
    }

    pub async fn create(&mut self, draft: TaskDraft) -> ApiResult<Task> {
        validate_new_task(&draft, self.today()?)?;
        let (Some(priority), Some(deadline)) = (draft.priority, draft.deadline) else {
            return Err(ApiError::Validation("Prioridade e deadline são obrigatórios.".to_string()));
        };
        let new = NewTask {
            title: draft.title,
            description: draft.description,
            owner: draft.owner,
            priority,
            deadline,
        };
        let task = self.service.create(&new).await?;
        info!(id = task.id, "task created");
        self.list.insert(task.clone());
        Ok(task)
    }

    pub async fn update(&mut self, id: u64, patch: TaskPatch) -> ApiResult<Task> {
        let current = self.cached(id)?;
        current.ensure_mutable(TaskAction::Edit)?;

        let draft = patch.draft_over(&current);
        validate_task_edit(&draft, self.today()?)?;

        let full = TaskPatch {
            title: Some(draft.title),
            description: Some(draft.description),
            owner: Some(draft.owner),
            priority: draft.priority,
            deadline: draft.deadline,
            status: draft.status,
        };
        let payload = self.service.update(id, &full).await?;
        let updated = payload.into_task(Some(&current), self.clock.now_utc())?;
        info!(id, "task updated");
        self.list.replace(id, updated.clone());
        Ok(updated)
    }

    /// Mark a task done. Allowed for any cached task.
    pub async fn complete(&mut self, id: u64) -> ApiResult<Task> {
        let current = self.cached(id)?;
        let mut patch = TaskPatch::from_task(&current);
        patch.status = Some(TaskStatus::Done);

        let payload = self.service.update(id, &patch).await?;
        let mut updated = payload.into_task(Some(&current), self.clock.now_utc())?;
        updated.status = TaskStatus::Done;
        info!(id, "task completed");
        self.list.replace(id, updated.clone());
        Ok(updated)
    }

    pub async fn delete(&mut self, id: u64) -> ApiResult<()> {
        let current = self.cached(id)?;
        current.ensure_mutable(TaskAction::Delete)?;
        self.service.delete(id).await?;
        info!(id, "task deleted");
        self.list.remove(id);
        Ok(())
    }

    fn cached(&self, id: u64) -> ApiResult<Task> {
        self.list
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Tarefa não encontrada".to_string()))
    }

    fn today(&self) -> ApiResult<chrono::NaiveDate> {
        today_in(&self.timezone, self.clock.now_utc()).map_err(|e| ApiError::Validation(e.to_string()))
    }
}
