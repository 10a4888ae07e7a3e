//! tarefas-core: domain types and pure logic for the Tarefas client.
//!
//! Nothing in here touches the network or the filesystem.

pub mod barrier;
pub mod subject;
pub mod task;
pub mod task_list;
pub mod time;
pub mod validation;

pub use barrier::LoadBarrier;
pub use subject::{Subject, Subscription};
pub use task::{Priority, Task, TaskAction, TaskRuleViolation, TaskStatus};
pub use task_list::{FilterCriteria, SortColumn, SortDirection, SortState, TaskList};
pub use time::{Clock, FixedClock, SystemClock, format_br, parse_deadline, today_in};
pub use validation::{
    FieldError, RegistrationForm, TaskDraft, ValidationErrors, validate_login,
    validate_new_task, validate_registration, validate_task_edit,
};
