//! TaskList: the full task collection plus a derived filtered/sorted view.
//!
//! Design:
//! - `tasks` is the canonical cache, in server order.
//! - `view` is always derived: filter(tasks, criteria) then sort(sort_state).
//!   Mutations never patch the view directly; they recompute it so the two
//!   cannot drift apart.
//! - Sorting is stable, so equal keys keep their relative order across
//!   repeated toggles.
//!
//! Comparators:
//! - id: numeric
//! - title, owner: case-insensitive
//! - priority: High=3, Medium=2, Low=1
//! - status: Pending=1, InProgress=2, Done=3
//! - deadline: calendar date

use crate::task::{Priority, Task, TaskStatus};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Declarative filter. Every field is optional; `None` and empty strings
/// mean "no constraint". Provided fields are AND-ed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Substring of the decimal id.
    pub id_substring: Option<String>,
    /// Case-insensitive substring of title OR description.
    pub text_substring: Option<String>,
    pub owner: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
}

fn provided(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|v| !v.is_empty())
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        provided(&self.id_substring).is_none()
            && provided(&self.text_substring).is_none()
            && provided(&self.owner).is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(id) = provided(&self.id_substring) {
            if !task.id.to_string().contains(id) {
                return false;
            }
        }

        if let Some(text) = provided(&self.text_substring) {
            let needle = text.to_lowercase();
            let hit = task.title.to_lowercase().contains(&needle)
                || task.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(owner) = provided(&self.owner) {
            if task.owner != owner {
                return false;
            }
        }

        if self.priority.is_some_and(|p| task.priority != p) {
            return false;
        }

        if self.status.is_some_and(|s| task.status != s) {
            return false;
        }

        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Id,
    Title,
    Owner,
    Priority,
    Status,
    Deadline,
}

impl SortColumn {
    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortColumn::Id => a.id.cmp(&b.id),
            SortColumn::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortColumn::Owner => a.owner.to_lowercase().cmp(&b.owner.to_lowercase()),
            SortColumn::Priority => a.priority.weight().cmp(&b.priority.weight()),
            SortColumn::Status => a.status.weight().cmp(&b.status.weight()),
            SortColumn::Deadline => a.deadline.cmp(&b.deadline),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortColumn::Id => "id",
            SortColumn::Title => "titulo",
            SortColumn::Owner => "responsavel",
            SortColumn::Priority => "prioridade",
            SortColumn::Status => "status",
            SortColumn::Deadline => "deadline",
        };
        f.write_str(s)
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" | "numero" => Ok(SortColumn::Id),
            "title" | "titulo" => Ok(SortColumn::Title),
            "owner" | "responsavel" => Ok(SortColumn::Owner),
            "priority" | "prioridade" => Ok(SortColumn::Priority),
            "status" | "situacao" => Ok(SortColumn::Status),
            "deadline" | "prazo" => Ok(SortColumn::Deadline),
            other => Err(format!("coluna de ordenação desconhecida: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub direction: SortDirection,
}

impl SortState {
    /// Same column flips direction; a new column starts ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Asc;
        }
    }

    fn apply(&self, tasks: &mut [Task]) {
        let Some(column) = self.column else { return };
        match self.direction {
            SortDirection::Asc => tasks.sort_by(|a, b| column.compare(a, b)),
            SortDirection::Desc => tasks.sort_by(|a, b| column.compare(b, a)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    view: Vec<Task>,
    criteria: FilterCriteria,
    sort: SortState,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut list = Self::new();
        list.replace_all(tasks);
        list
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    /// Filtered and sorted view.
    pub fn view(&self) -> &[Task] {
        &self.view
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.recompute();
    }

    /// Resets the view to the full set and reapplies the active sort.
    pub fn clear_criteria(&mut self) {
        self.set_criteria(FilterCriteria::default());
    }

    pub fn sort_by(&mut self, column: SortColumn) {
        self.sort.toggle(column);
        self.sort.apply(&mut self.view);
    }

    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.recompute();
    }

    pub fn insert(&mut self, task: Task) {
        self.tasks.push(task);
        self.recompute();
    }

    /// Swap in the server's copy of task `id`. Returns false if unknown.
    pub fn replace(&mut self, id: u64, task: Task) -> bool {
        let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        *slot = task;
        self.recompute();
        true
    }

    pub fn remove(&mut self, id: u64) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        let removed = self.tasks.remove(idx);
        self.recompute();
        Some(removed)
    }

    fn recompute(&mut self) {
        self.view = self
            .tasks
            .iter()
            .filter(|t| self.criteria.matches(t))
            .cloned()
            .collect();
        self.sort.apply(&mut self.view);
    }
}
