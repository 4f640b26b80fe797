use super::{StoreError, StoreResult, TaskStore, stage_plan, stage_removal, validate_tasks};
use crate::ordering::{DropPlan, next_order};
use crate::task::{NewTask, Task, TaskPatch};
use crate::task_validation;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::collections::HashMap;
use uuid::Uuid;

/// Task store backed by a SQLite file. Each mutation runs in one transaction.
pub struct SqliteTaskStore {
    connection: Connection,
}

impl SqliteTaskStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> StoreResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self { connection })
    }

    pub fn in_memory() -> StoreResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self { connection })
    }

    fn initialize_schema(connection: &Connection) -> StoreResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                sort_order INTEGER NOT NULL,
                task_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS tasks_by_day ON tasks (date, sort_order);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn write_task(tx: &Transaction, task: &Task) -> StoreResult<()> {
        let json = serde_json::to_string(task)?;
        tx.execute(
            "INSERT INTO tasks (id, date, sort_order, task_json) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                date = excluded.date,
                sort_order = excluded.sort_order,
                task_json = excluded.task_json",
            params![task.id, task.date.format("%Y-%m-%d").to_string(), task.order, json],
        )?;
        Ok(())
    }

    /// Persist every task of `staged` that differs from `current`, deleting
    /// `removed` in the same transaction.
    fn write_changes(
        &mut self,
        current: &[Task],
        staged: &[Task],
        removed: Option<&str>,
    ) -> StoreResult<usize> {
        let before: HashMap<&str, &Task> = current.iter().map(|task| (task.id.as_str(), task)).collect();
        let tx = self.connection.transaction()?;
        if let Some(id) = removed {
            tx.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        }
        let mut written = 0;
        for task in staged {
            if before.get(task.id.as_str()) != Some(&task) {
                Self::write_task(&tx, task)?;
                written += 1;
            }
        }
        tx.commit()?;
        Ok(written)
    }
}

impl TaskStore for SqliteTaskStore {
    fn tasks(&self) -> StoreResult<Vec<Task>> {
        let mut stmt = self
            .connection
            .prepare("SELECT task_json FROM tasks ORDER BY date ASC, sort_order ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut tasks = Vec::new();
        for json in rows {
            let task: Task = serde_json::from_str(&json?)?;
            tasks.push(task);
        }
        validate_tasks(&tasks)?;
        Ok(tasks)
    }

    fn find_task(&self, id: &str) -> StoreResult<Option<Task>> {
        let json: Option<String> = self
            .connection
            .query_row("SELECT task_json FROM tasks WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        json.map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    fn insert_task(&mut self, draft: NewTask) -> StoreResult<Task> {
        let tasks = self.tasks()?;
        let order = next_order(&tasks, draft.date);
        let task = draft.into_task(Uuid::new_v4().to_string(), order);
        task_validation::validate_task(&task)?;
        let tx = self.connection.transaction()?;
        Self::write_task(&tx, &task)?;
        tx.commit()?;
        Ok(task)
    }

    fn update_task(&mut self, id: &str, patch: &TaskPatch) -> StoreResult<Task> {
        let mut task = self
            .find_task(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        task.apply_patch(patch)?;
        let tx = self.connection.transaction()?;
        Self::write_task(&tx, &task)?;
        tx.commit()?;
        Ok(task)
    }

    fn remove_task(&mut self, id: &str) -> StoreResult<Task> {
        let current = self.tasks()?;
        let (removed, staged) = stage_removal(&current, id)?;
        let written = self.write_changes(&current, &staged, Some(&removed.id))?;
        tracing::debug!(task_id = %removed.id, written, "removed task");
        Ok(removed)
    }

    fn apply_plan(&mut self, plan: &DropPlan) -> StoreResult<()> {
        let current = self.tasks()?;
        let staged = stage_plan(&current, plan)?;
        let written = self.write_changes(&current, &staged, None)?;
        tracing::debug!(written, "persisted drop plan");
        Ok(())
    }
}
