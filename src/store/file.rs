use super::{StoreError, StoreResult, validate_tasks};
use crate::task::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct TaskSnapshot {
    tasks: Vec<Task>,
}

pub fn save_tasks_to_json<P: AsRef<Path>>(tasks: &[Task], path: P) -> StoreResult<()> {
    validate_tasks(tasks)?;
    let snapshot = TaskSnapshot {
        tasks: tasks.to_vec(),
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_tasks_from_json<P: AsRef<Path>>(path: P) -> StoreResult<Vec<Task>> {
    let file = File::open(path)?;
    let snapshot: TaskSnapshot = serde_json::from_reader(file)?;
    validate_tasks(&snapshot.tasks)?;
    Ok(snapshot.tasks)
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    title: String,
    description: String,
    date: String,
    completed: String,
    order: u32,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            date: task.date.format("%Y-%m-%d").to_string(),
            completed: task.completed.to_string(),
            order: task.order,
        }
    }
}

impl TaskCsvRecord {
    fn into_task(self) -> StoreResult<Task> {
        let date = parse_date(&self.date)?;
        let completed = parse_bool(&self.completed)?;
        let mut task =
            Task::new(self.id, self.title, date, self.order).with_description(self.description);
        task.completed = completed;
        Ok(task)
    }
}

pub fn save_tasks_to_csv<P: AsRef<Path>>(tasks: &[Task], path: P) -> StoreResult<()> {
    validate_tasks(tasks)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for task in tasks {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> StoreResult<Vec<Task>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        tasks.push(record?.into_task()?);
    }
    validate_tasks(&tasks)?;
    Ok(tasks)
}

fn parse_date(input: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| StoreError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_bool(input: &str) -> StoreResult<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "false" => Ok(false),
        "true" => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid boolean '{other}'"
        ))),
    }
}
