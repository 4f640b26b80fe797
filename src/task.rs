use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task_validation::{self, TaskValidationError};

/// A task scheduled on one calendar day.
///
/// `order` ranks the task among the tasks sharing its `date`; for any date the
/// orders form the dense sequence `0..n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub order: u32,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, date: NaiveDate, order: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            date,
            completed: false,
            order,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize_description(Some(description.into()));
        self
    }

    /// Case-insensitive substring match over title and description. An empty
    /// query matches every task.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        if self.title.to_lowercase().contains(&needle) {
            return true;
        }
        self.description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(&needle))
    }

    /// Apply an edit to the user-editable fields. Ordering fields are never
    /// touched here; those only change through ordering deltas.
    pub fn apply_patch(&mut self, patch: &TaskPatch) -> Result<(), TaskValidationError> {
        let mut updated = self.clone();
        if let Some(title) = &patch.title {
            updated.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            updated.description = normalize_description(Some(description.clone()));
        }
        if let Some(completed) = patch.completed {
            updated.completed = completed;
        }
        task_validation::validate_task(&updated)?;
        *self = updated;
        Ok(())
    }
}

/// Fields supplied by a user when creating a task. The store assigns the id
/// and the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl NewTask {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: None,
            date,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn into_task(self, id: String, order: u32) -> Task {
        Task {
            id,
            title: self.title.trim().to_string(),
            description: normalize_description(self.description),
            date: self.date,
            completed: false,
            order,
        }
    }
}

/// Partial update of a task. A description of `Some("")` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// Tasks matching `query`, in input order.
pub fn filter_tasks<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    tasks.iter().filter(|task| task.matches_query(query)).collect()
}

/// Tasks scheduled on `date`, ascending by order.
pub fn tasks_on(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    let mut day: Vec<&Task> = tasks.iter().filter(|task| task.date == date).collect();
    day.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    day
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn blank_description_is_dropped() {
        let task = Task::new("a", "Title", d(2025, 1, 1), 0).with_description("   ");
        assert_eq!(task.description, None);
    }

    #[test]
    fn new_task_trims_title_and_description() {
        let task = NewTask::new("  Plan  ", d(2025, 1, 1))
            .with_description(" notes ")
            .into_task("x".into(), 3);
        assert_eq!(task.title, "Plan");
        assert_eq!(task.description.as_deref(), Some("notes"));
        assert_eq!(task.order, 3);
        assert!(!task.completed);
    }
}
