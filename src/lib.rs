pub mod assembler;
pub mod config;
pub mod grid;
pub mod holidays;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod ordering;
pub mod store;
pub mod task;
pub(crate) mod task_validation;
#[cfg(any(feature = "cli", feature = "http_api"))]
pub mod telemetry;

pub use assembler::{CalendarAssembler, CalendarCell, MonthView};
pub use config::{CalendarConfig, ConfigError};
pub use grid::{GridDay, GridError, GridLayout, YearMonth};
pub use holidays::{Holiday, HolidayCache, HolidayType, LunarPolicy};
pub use ordering::{DragIntent, DropPlan, DropTarget, OrderError, TaskDelta};
#[cfg(feature = "sqlite")]
pub use store::sqlite::SqliteTaskStore;
pub use store::{
    InMemoryTaskStore, StoreError, TaskStore, load_tasks_from_csv, load_tasks_from_json,
    save_tasks_to_csv, save_tasks_to_json, validate_tasks,
};
pub use task::{NewTask, Task, TaskPatch, filter_tasks};
pub use task_validation::{TaskValidationError, validate_task_collection};
