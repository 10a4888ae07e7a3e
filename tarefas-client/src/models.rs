//! Wire shapes of the Tarefas API and their conversion to core types.
//!
//! Inbound task payloads are fully optional: the server may omit any field,
//! and the client fills gaps from the copy it already had.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tarefas_core::{Priority, Task, TaskDraft, TaskStatus, parse_deadline};

use crate::error::ApiError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub id: Option<u64>,
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub responsavel: Option<String>,
    pub prioridade: Option<String>,
    pub deadline: Option<String>,
    pub status: Option<String>,
    pub concluida: Option<bool>,
    pub criado_em: Option<String>,
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.is_empty())
}

impl TaskPayload {
    /// Build a task from this payload. Fields the server left out come from
    /// `previous`; with no previous copy they take neutral defaults
    /// (`created_at` becomes `now`). Only a missing deadline is an error.
    pub fn into_task(self, previous: Option<&Task>, now: DateTime<Utc>) -> Result<Task, ApiError> {
        let deadline = match self.deadline.as_deref().map(parse_deadline) {
            Some(Ok(d)) => Some(d),
            _ => previous.map(|p| p.deadline),
        }
        .ok_or_else(|| ApiError::Json(format!("tarefa {} sem deadline válida", self.id.unwrap_or(0))))?;

        let status = match (self.status.as_deref(), self.concluida) {
            (Some(s), _) if !s.is_empty() => Some(TaskStatus::from_backend(s)),
            (_, Some(true)) => Some(TaskStatus::Done),
            _ => None,
        };

        Ok(Task {
            id: self
                .id
                .filter(|id| *id != 0)
                .or(previous.map(|p| p.id))
                .unwrap_or(0),
            title: non_empty(self.titulo)
                .or_else(|| previous.map(|p| p.title.clone()))
                .unwrap_or_default(),
            description: non_empty(self.descricao)
                .or_else(|| previous.map(|p| p.description.clone()))
                .unwrap_or_default(),
            owner: non_empty(self.responsavel)
                .or_else(|| previous.map(|p| p.owner.clone()))
                .unwrap_or_default(),
            priority: non_empty(self.prioridade)
                .map(|p| Priority::from_backend(&p))
                .or(previous.map(|p| p.priority))
                .unwrap_or(Priority::Low),
            deadline,
            status: status
                .or(previous.map(|p| p.status))
                .unwrap_or(TaskStatus::Pending),
            created_at: self
                .criado_em
                .as_deref()
                .and_then(parse_timestamp)
                .or(previous.map(|p| p.created_at))
                .unwrap_or(now),
        })
    }
}

/// Body of `POST {tarefas}/criar`. New tasks always start pending.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub owner: String,
    pub priority: Priority,
    pub deadline: NaiveDate,
}

#[derive(Serialize)]
struct TaskBody<'a> {
    titulo: &'a str,
    descricao: &'a str,
    responsavel: &'a str,
    prioridade: &'static str,
    deadline: String,
    status: &'static str,
    concluida: bool,
}

impl NewTask {
    pub fn to_body(&self) -> Result<serde_json::Value, ApiError> {
        let status = TaskStatus::Pending;
        Ok(serde_json::to_value(TaskBody {
            titulo: &self.title,
            descricao: &self.description,
            responsavel: &self.owner,
            prioridade: self.priority.code(),
            deadline: self.deadline.format("%Y-%m-%d").to_string(),
            status: status.code(),
            concluida: status == TaskStatus::Done,
        })?)
    }

    /// Local stand-in used to fill fields the create response omits.
    pub fn as_unsaved(&self, now: DateTime<Utc>) -> Task {
        Task::new(0, self.title.clone(), self.deadline, now)
            .with_description(self.description.clone())
            .with_owner(self.owner.clone())
            .with_priority(self.priority)
    }
}

/// Partial update for `PUT {tarefas}/{id}`; `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
}

#[derive(Serialize)]
struct PatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    titulo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    descricao: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    responsavel: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prioridade: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    concluida: Option<bool>,
}

impl TaskPatch {
    /// Every field of `task`, i.e. a full replacement.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: Some(task.title.clone()),
            description: Some(task.description.clone()),
            owner: Some(task.owner.clone()),
            priority: Some(task.priority),
            deadline: Some(task.deadline),
            status: Some(task.status),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Overlay this patch onto `task`, as form values for validation.
    pub fn draft_over(&self, task: &Task) -> TaskDraft {
        TaskDraft {
            title: self.title.clone().unwrap_or_else(|| task.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| task.description.clone()),
            owner: self.owner.clone().unwrap_or_else(|| task.owner.clone()),
            priority: Some(self.priority.unwrap_or(task.priority)),
            deadline: Some(self.deadline.unwrap_or(task.deadline)),
            status: Some(self.status.unwrap_or(task.status)),
        }
    }

    pub fn to_body(&self, id: u64) -> Result<serde_json::Value, ApiError> {
        Ok(serde_json::to_value(PatchBody {
            id: Some(id),
            titulo: self.title.as_deref(),
            descricao: self.description.as_deref(),
            responsavel: self.owner.as_deref(),
            prioridade: self.priority.map(Priority::code),
            deadline: self.deadline.map(|d| d.format("%Y-%m-%d").to_string()),
            status: self.status.map(TaskStatus::code),
            concluida: self.status.map(|s| s == TaskStatus::Done),
        })?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub id: Option<u64>,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub ativo: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub nome: String,
    pub email: String,
    pub username: String,
    pub senha: String,
}
