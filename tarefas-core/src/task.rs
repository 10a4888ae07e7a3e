//! Task model shared by the client and the CLI.
//!
//! The API speaks in uppercase codes (`ALTA`, `EM_ANDAMENTO`, ...) while
//! everything user-facing uses the Portuguese labels. Both directions of the
//! mapping live here so the rest of the workspace only handles the enums.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Baixa",
            Priority::Medium => "Média",
            Priority::High => "Alta",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Priority::Low => "BAIXA",
            Priority::Medium => "MEDIA",
            Priority::High => "ALTA",
        }
    }

    /// Sort weight: High=3, Medium=2, Low=1.
    pub fn weight(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// Accepts a backend code or a display label; anything else is `Low`.
    pub fn from_backend(s: &str) -> Self {
        Self::parse(s).unwrap_or(Priority::Low)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "ALTA" | "Alta" => Some(Priority::High),
            "MEDIA" | "Média" | "Media" => Some(Priority::Medium),
            "BAIXA" | "Baixa" => Some(Priority::Low),
            other => match other.to_lowercase().as_str() {
                "alta" | "high" => Some(Priority::High),
                "média" | "media" | "medium" => Some(Priority::Medium),
                "baixa" | "low" => Some(Priority::Low),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Strict parse for user input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("prioridade desconhecida: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Done];

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pendente",
            TaskStatus::InProgress => "Em Andamento",
            TaskStatus::Done => "Concluída",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDENTE",
            TaskStatus::InProgress => "EM_ANDAMENTO",
            TaskStatus::Done => "CONCLUIDA",
        }
    }

    /// Sort weight: Pending=1, InProgress=2, Done=3.
    pub fn weight(self) -> u8 {
        match self {
            TaskStatus::Pending => 1,
            TaskStatus::InProgress => 2,
            TaskStatus::Done => 3,
        }
    }

    /// Accepts a backend code or a display label; anything else is `Pending`.
    pub fn from_backend(s: &str) -> Self {
        Self::parse(s).unwrap_or(TaskStatus::Pending)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "PENDENTE" | "Pendente" => Some(TaskStatus::Pending),
            "EM_ANDAMENTO" | "Em Andamento" => Some(TaskStatus::InProgress),
            "CONCLUIDA" | "Concluída" => Some(TaskStatus::Done),
            other => match other.to_lowercase().replace(['-', '_'], " ").as_str() {
                "pendente" | "pending" => Some(TaskStatus::Pending),
                "em andamento" | "in progress" | "inprogress" => Some(TaskStatus::InProgress),
                "concluída" | "concluida" | "done" => Some(TaskStatus::Done),
                _ => None,
            },
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("status desconhecido: {s}"))
    }
}

/// Client-side cache copy of a server task. `id == 0` means unsaved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub priority: Priority,
    pub deadline: NaiveDate,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

/// Mutations guarded by the completed-task rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Edit,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRuleViolation {
    pub task_id: u64,
    pub action: TaskAction,
}

impl TaskRuleViolation {
    pub fn message(&self) -> &'static str {
        match self.action {
            TaskAction::Edit => "Tarefas concluídas não podem ser editadas.",
            TaskAction::Delete => "Tarefas concluídas não podem ser excluídas.",
        }
    }
}

impl fmt::Display for TaskRuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for TaskRuleViolation {}

impl Task {
    pub fn new(
        id: u64,
        title: impl Into<String>,
        deadline: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            owner: String::new(),
            priority: Priority::Low,
            deadline,
            status: TaskStatus::Pending,
            created_at,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn is_saved(&self) -> bool {
        self.id != 0
    }

    /// Done tasks can be neither edited nor deleted.
    pub fn ensure_mutable(&self, action: TaskAction) -> Result<(), TaskRuleViolation> {
        if self.is_done() {
            return Err(TaskRuleViolation {
                task_id: self.id,
                action,
            });
        }
        Ok(())
    }
}
