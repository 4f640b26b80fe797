//! Per-day task ordering.
//!
//! Planning functions never mutate anything: they inspect the current task
//! set and return the deltas that keep each day's orders dense. Callers apply
//! a plan as one unit (see [`apply_deltas`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::task::{Task, tasks_on};
use crate::task_validation::{TaskValidationError, check_day_sequence};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("malformed drag payload: {0}")]
    MalformedPayload(String),
    #[error("task {0} not found")]
    UnknownTask(String),
    #[error(
        "drag intent for task {task_id} is stale: intent says {intent_date} #{intent_order}, task is on {actual_date} #{actual_order}"
    )]
    StaleIntent {
        task_id: String,
        intent_date: NaiveDate,
        intent_order: u32,
        actual_date: NaiveDate,
        actual_order: u32,
    },
    #[error("target order {order} is out of range for {date} ({len} tasks)")]
    TargetOutOfRange { date: NaiveDate, order: u32, len: usize },
    #[error(transparent)]
    Sequence(#[from] TaskValidationError),
}

pub type OrderResult<T> = Result<T, OrderError>;

/// A pending move of one task, as captured when the drag started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragIntent {
    pub task_id: String,
    pub source_date: NaiveDate,
    #[serde(default)]
    pub source_index: usize,
    pub current_order: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DragPayload {
    #[serde(rename = "type")]
    kind: Option<String>,
    task_id: Option<String>,
    source_date: Option<String>,
    #[serde(default)]
    source_index: usize,
    current_order: Option<u32>,
}

impl DragIntent {
    pub fn for_task(task: &Task, source_index: usize) -> Self {
        Self {
            task_id: task.id.clone(),
            source_date: task.date,
            source_index,
            current_order: task.order,
        }
    }

    /// Parse the JSON a drag source attached to the drop event.
    pub fn from_json(payload: &str) -> OrderResult<Self> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|err| OrderError::MalformedPayload(err.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> OrderResult<Self> {
        let payload: DragPayload = serde_json::from_value(value)
            .map_err(|err| OrderError::MalformedPayload(err.to_string()))?;

        if payload.kind.as_deref() != Some("task") {
            return Err(OrderError::MalformedPayload(
                "payload is not a task drag".into(),
            ));
        }
        let task_id = payload
            .task_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| OrderError::MalformedPayload("missing taskId".into()))?;
        let source_date = payload
            .source_date
            .ok_or_else(|| OrderError::MalformedPayload("missing sourceDate".into()))?;
        let source_date = NaiveDate::parse_from_str(source_date.trim(), "%Y-%m-%d").map_err(
            |_| OrderError::MalformedPayload(format!("sourceDate '{source_date}' is not a calendar date")),
        )?;
        let current_order = payload
            .current_order
            .ok_or_else(|| OrderError::MalformedPayload("missing currentOrder".into()))?;

        Ok(Self {
            task_id,
            source_date,
            source_index: payload.source_index,
            current_order,
        })
    }

    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "type": "task",
            "taskId": self.task_id,
            "sourceDate": self.source_date.format("%Y-%m-%d").to_string(),
            "sourceIndex": self.source_index,
            "currentOrder": self.current_order,
        })
    }
}

/// Where a task was dropped. `order` is the order of the row under the
/// pointer; `None` means the drop landed on the day outside any row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl DropTarget {
    pub fn end_of_day(date: NaiveDate) -> Self {
        Self { date, order: None }
    }

    pub fn onto(date: NaiveDate, order: u32) -> Self {
        Self {
            date,
            order: Some(order),
        }
    }
}

/// New placement for one task. `date` is set only when the task changes day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDelta {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub order: u32,
}

impl TaskDelta {
    pub fn reorder(task_id: impl Into<String>, order: u32) -> Self {
        Self {
            task_id: task_id.into(),
            date: None,
            order,
        }
    }

    pub fn relocate(task_id: impl Into<String>, date: NaiveDate, order: u32) -> Self {
        Self {
            task_id: task_id.into(),
            date: Some(date),
            order,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropPlan {
    pub deltas: Vec<TaskDelta>,
    /// Day a task left; the store compacts it after applying the deltas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacated_day: Option<NaiveDate>,
}

impl DropPlan {
    pub fn is_noop(&self) -> bool {
        self.deltas.is_empty() && self.vacated_day.is_none()
    }
}

/// Plan the drop of `intent` onto `target`.
///
/// Same-day drops reorder; drops on another day append the task there. A drop
/// onto a row takes that row's order, so the task lands after the row when
/// moving down and before it when moving up. A same-day drop outside any row
/// moves the task to the last slot.
#[tracing::instrument(level = "debug", skip(tasks), fields(task_id = %intent.task_id))]
pub fn plan_drop(tasks: &[Task], intent: &DragIntent, target: &DropTarget) -> OrderResult<DropPlan> {
    let task = find_task(tasks, &intent.task_id)?;
    if task.date != intent.source_date || task.order != intent.current_order {
        tracing::warn!(task_id = %task.id, "rejecting stale drag intent");
        return Err(OrderError::StaleIntent {
            task_id: task.id.clone(),
            intent_date: intent.source_date,
            intent_order: intent.current_order,
            actual_date: task.date,
            actual_order: task.order,
        });
    }

    if target.date == task.date {
        plan_reorder(tasks, &task.id, target.order)
    } else {
        plan_move(tasks, &task.id, target.date)
    }
}

/// Move a task to `target_order` within its own day. `None` targets the last
/// slot.
pub fn plan_reorder(tasks: &[Task], task_id: &str, target_order: Option<u32>) -> OrderResult<DropPlan> {
    let task = find_task(tasks, task_id)?;
    let day = check_day_sequence(tasks, task.date)?;
    let len = day.len();
    let last = u32::try_from(len.saturating_sub(1)).unwrap_or(u32::MAX);
    let target = target_order.unwrap_or(last);
    if target as usize >= len {
        return Err(OrderError::TargetOutOfRange {
            date: task.date,
            order: target,
            len,
        });
    }

    let current = task.order;
    if current == target {
        return Ok(DropPlan::default());
    }

    let mut deltas: Vec<TaskDelta> = day
        .iter()
        .filter(|other| other.id != task.id)
        .filter_map(|other| {
            if current < target && other.order > current && other.order <= target {
                Some(TaskDelta::reorder(other.id.clone(), other.order - 1))
            } else if current > target && other.order >= target && other.order < current {
                Some(TaskDelta::reorder(other.id.clone(), other.order + 1))
            } else {
                None
            }
        })
        .collect();
    deltas.push(TaskDelta::reorder(task.id.clone(), target));

    Ok(DropPlan {
        deltas,
        vacated_day: None,
    })
}

/// Append a task to the end of `target_date`. The day it leaves is reported
/// as vacated rather than renumbered here.
pub fn plan_move(tasks: &[Task], task_id: &str, target_date: NaiveDate) -> OrderResult<DropPlan> {
    let task = find_task(tasks, task_id)?;
    if task.date == target_date {
        return plan_reorder(tasks, task_id, None);
    }
    check_day_sequence(tasks, task.date)?;
    let target_day = check_day_sequence(tasks, target_date)?;
    let order = u32::try_from(target_day.len()).unwrap_or(u32::MAX);

    Ok(DropPlan {
        deltas: vec![TaskDelta::relocate(task.id.clone(), target_date, order)],
        vacated_day: Some(task.date),
    })
}

/// Order a new task on `date` receives: the current count of that day.
pub fn next_order(tasks: &[Task], date: NaiveDate) -> u32 {
    let count = tasks.iter().filter(|task| task.date == date).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Deltas renumbering `date` to `0..n`, keeping the relative order of its
/// tasks. Used by stores after a task leaves a day.
pub fn compaction_deltas(tasks: &[Task], date: NaiveDate) -> Vec<TaskDelta> {
    tasks_on(tasks, date)
        .into_iter()
        .zip(0u32..)
        .filter(|(task, idx)| task.order != *idx)
        .map(|(task, idx)| TaskDelta::reorder(task.id.clone(), idx))
        .collect()
}

/// Apply `deltas` to `tasks`. Every referenced task is resolved before any is
/// written, so an unknown id leaves `tasks` untouched.
pub fn apply_deltas(tasks: &mut [Task], deltas: &[TaskDelta]) -> OrderResult<()> {
    let resolved = {
        let positions: HashMap<&str, usize> = tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| (task.id.as_str(), idx))
            .collect();
        deltas
            .iter()
            .map(|delta| {
                positions
                    .get(delta.task_id.as_str())
                    .copied()
                    .ok_or_else(|| OrderError::UnknownTask(delta.task_id.clone()))
            })
            .collect::<OrderResult<Vec<usize>>>()?
    };

    for (idx, delta) in resolved.into_iter().zip(deltas) {
        let task = &mut tasks[idx];
        if let Some(date) = delta.date {
            task.date = date;
        }
        task.order = delta.order;
    }
    Ok(())
}

fn find_task<'a>(tasks: &'a [Task], task_id: &str) -> OrderResult<&'a Task> {
    tasks
        .iter()
        .find(|task| task.id == task_id)
        .ok_or_else(|| OrderError::UnknownTask(task_id.to_string()))
}
