use super::{StoreError, StoreResult, TaskStore, stage_plan, stage_removal, validate_tasks};
use crate::ordering::{DropPlan, next_order};
use crate::task::{NewTask, Task, TaskPatch};
use crate::task_validation;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Vec<Task>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> StoreResult<Self> {
        validate_tasks(&tasks)?;
        Ok(Self { tasks })
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Replace the whole collection, e.g. after loading a snapshot.
    pub fn replace(&mut self, tasks: Vec<Task>) -> StoreResult<()> {
        validate_tasks(&tasks)?;
        self.tasks = tasks;
        Ok(())
    }
}

impl TaskStore for InMemoryTaskStore {
    fn tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(self.tasks.clone())
    }

    fn find_task(&self, id: &str) -> StoreResult<Option<Task>> {
        Ok(self.tasks.iter().find(|task| task.id == id).cloned())
    }

    fn insert_task(&mut self, draft: NewTask) -> StoreResult<Task> {
        let order = next_order(&self.tasks, draft.date);
        let task = draft.into_task(Uuid::new_v4().to_string(), order);
        task_validation::validate_task(&task)?;
        self.tasks.push(task.clone());
        tracing::debug!(task_id = %task.id, date = %task.date, order, "inserted task");
        Ok(task)
    }

    fn update_task(&mut self, id: &str, patch: &TaskPatch) -> StoreResult<Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        task.apply_patch(patch)?;
        Ok(task.clone())
    }

    fn remove_task(&mut self, id: &str) -> StoreResult<Task> {
        let (removed, staged) = stage_removal(&self.tasks, id)?;
        self.tasks = staged;
        tracing::debug!(task_id = %removed.id, date = %removed.date, "removed task");
        Ok(removed)
    }

    fn apply_plan(&mut self, plan: &DropPlan) -> StoreResult<()> {
        self.tasks = stage_plan(&self.tasks, plan)?;
        Ok(())
    }
}
