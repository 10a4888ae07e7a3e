//! Initial data for the task views: owners, statuses, priorities, tasks.
//!
//! The four loads run concurrently. A [`LoadBarrier`] counts them as they
//! settle, failures included, and clears the `loading` flag exactly once
//! after the last one.

use tarefas_core::{LoadBarrier, Priority, Subject, Task, TaskStatus};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::services::TaskService;

const INITIAL_LOADS: usize = 4;

#[derive(Debug)]
pub struct InitialData {
    pub owners: ApiResult<Vec<String>>,
    pub statuses: ApiResult<Vec<TaskStatus>>,
    pub priorities: ApiResult<Vec<Priority>>,
    pub tasks: ApiResult<Vec<Task>>,
}

impl InitialData {
    pub fn failures(&self) -> Vec<&ApiError> {
        [
            self.owners.as_ref().err(),
            self.statuses.as_ref().err(),
            self.priorities.as_ref().err(),
            self.tasks.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub async fn load_initial_data(service: &TaskService, loading: &Subject<bool>) -> InitialData {
    loading.next(true);
    let flag = loading.clone();
    let barrier = LoadBarrier::new(INITIAL_LOADS, move || flag.next(false));

    let settle = |what: &'static str, failed: bool| {
        if failed {
            warn!(load = what, "initial load failed");
        }
        barrier.arrive();
    };

    let (owners, statuses, priorities, tasks) = tokio::join!(
        async {
            let r = service.list_owners().await;
            settle("owners", r.is_err());
            r
        },
        async {
            let r = service.list_statuses().await;
            settle("statuses", r.is_err());
            r
        },
        async {
            let r = service.list_priorities().await;
            settle("priorities", r.is_err());
            r
        },
        async {
            let r = service.list().await;
            settle("tasks", r.is_err());
            r
        },
    );

    InitialData {
        owners,
        statuses,
        priorities,
        tasks,
    }
}
