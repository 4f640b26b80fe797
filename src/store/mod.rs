use crate::ordering::{self, DragIntent, DropPlan, DropTarget, OrderError};
use crate::task::{NewTask, Task, TaskPatch};
use crate::task_validation::{self, TaskValidationError};
use chrono::NaiveDate;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("task {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Validation(#[from] TaskValidationError),
    #[error(transparent)]
    Order(#[from] OrderError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Owner of the task records. The ordering engine only computes plans; a store
/// applies them.
pub trait TaskStore {
    fn tasks(&self) -> StoreResult<Vec<Task>>;

    /// Create a task at the end of its day.
    fn insert_task(&mut self, draft: NewTask) -> StoreResult<Task>;

    fn update_task(&mut self, id: &str, patch: &TaskPatch) -> StoreResult<Task>;

    /// Remove a task and close the gap it leaves in its day.
    fn remove_task(&mut self, id: &str) -> StoreResult<Task>;

    /// Apply every delta of `plan` or none of them.
    fn apply_plan(&mut self, plan: &DropPlan) -> StoreResult<()>;

    fn find_task(&self, id: &str) -> StoreResult<Option<Task>> {
        Ok(self.tasks()?.into_iter().find(|task| task.id == id))
    }

    fn tasks_on(&self, date: NaiveDate) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks()?;
        Ok(crate::task::tasks_on(&tasks, date).into_iter().cloned().collect())
    }

    fn toggle_completed(&mut self, id: &str) -> StoreResult<Task> {
        let task = self
            .find_task(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.update_task(id, &TaskPatch::completed(!task.completed))
    }

    /// Plan and apply a drop in one step.
    fn drop_task(&mut self, intent: &DragIntent, target: &DropTarget) -> StoreResult<DropPlan> {
        let tasks = self.tasks()?;
        let plan = ordering::plan_drop(&tasks, intent, target)?;
        if !plan.is_noop() {
            self.apply_plan(&plan)?;
            tracing::info!(
                task_id = %intent.task_id,
                deltas = plan.deltas.len(),
                vacated = ?plan.vacated_day,
                "applied drop plan"
            );
        }
        Ok(plan)
    }
}

/// The task set after `plan`, including compaction of the vacated day.
/// `tasks` itself is left untouched.
pub(crate) fn stage_plan(tasks: &[Task], plan: &DropPlan) -> StoreResult<Vec<Task>> {
    let mut staged = tasks.to_vec();
    ordering::apply_deltas(&mut staged, &plan.deltas)?;
    if let Some(date) = plan.vacated_day {
        let compaction = ordering::compaction_deltas(&staged, date);
        ordering::apply_deltas(&mut staged, &compaction)?;
    }
    task_validation::validate_task_collection(&staged)?;
    Ok(staged)
}

/// The task set with `id` removed and its day renumbered.
pub(crate) fn stage_removal(tasks: &[Task], id: &str) -> StoreResult<(Task, Vec<Task>)> {
    let position = tasks
        .iter()
        .position(|task| task.id == id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    let mut staged = tasks.to_vec();
    let removed = staged.remove(position);
    let compaction = ordering::compaction_deltas(&staged, removed.date);
    ordering::apply_deltas(&mut staged, &compaction)?;
    Ok((removed, staged))
}

pub fn validate_tasks(tasks: &[Task]) -> StoreResult<()> {
    task_validation::validate_task_collection(tasks).map_err(StoreError::from)
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{load_tasks_from_csv, load_tasks_from_json, save_tasks_to_csv, save_tasks_to_json};
pub use memory::InMemoryTaskStore;
