use crate::task::{Task, tasks_on};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("task id must not be empty")]
    EmptyId,
    #[error("task {0} must have a non-empty title")]
    EmptyTitle(String),
    #[error("duplicate task id {0}")]
    DuplicateId(String),
    #[error("tasks on {date} do not form a dense order sequence (found orders {orders:?})")]
    BrokenSequence { date: NaiveDate, orders: Vec<u32> },
}

pub fn validate_task(task: &Task) -> Result<(), TaskValidationError> {
    if task.id.trim().is_empty() {
        return Err(TaskValidationError::EmptyId);
    }
    if task.title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle(task.id.clone()));
    }
    Ok(())
}

/// Tasks on `date` sorted by order, or an error when their orders are not
/// exactly `0..n`.
pub fn check_day_sequence(
    tasks: &[Task],
    date: NaiveDate,
) -> Result<Vec<&Task>, TaskValidationError> {
    let day = tasks_on(tasks, date);
    let dense = day
        .iter()
        .enumerate()
        .all(|(idx, task)| task.order as usize == idx);
    if !dense {
        return Err(TaskValidationError::BrokenSequence {
            date,
            orders: day.iter().map(|task| task.order).collect(),
        });
    }
    Ok(day)
}

pub fn validate_task_collection(tasks: &[Task]) -> Result<(), TaskValidationError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen_ids.insert(task.id.as_str()) {
            return Err(TaskValidationError::DuplicateId(task.id.clone()));
        }
        validate_task(task)?;
    }

    let dates: BTreeSet<NaiveDate> = tasks.iter().map(|task| task.date).collect();
    for date in dates {
        check_day_sequence(tasks, date)?;
    }
    Ok(())
}
