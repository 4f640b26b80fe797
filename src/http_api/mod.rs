use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    CalendarAssembler, DragIntent, DropPlan, DropTarget, GridError, Holiday, InMemoryTaskStore,
    MonthView, NewTask, OrderError, StoreError, Task, TaskPatch, TaskStore, YearMonth,
    filter_tasks,
};

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<InMemoryTaskStore>>,
    assembler: Arc<CalendarAssembler>,
}

impl AppState {
    pub fn new(store: InMemoryTaskStore, assembler: CalendarAssembler) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            assembler: Arc::new(assembler),
        }
    }

    pub fn with_shared(
        store: Arc<RwLock<InMemoryTaskStore>>,
        assembler: Arc<CalendarAssembler>,
    ) -> Self {
        Self { store, assembler }
    }

    fn store(&self) -> Arc<RwLock<InMemoryTaskStore>> {
        self.store.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<GridError> for ApiError {
    fn from(value: GridError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<OrderError> for ApiError {
    fn from(value: OrderError) -> Self {
        match value {
            OrderError::UnknownTask(_) => ApiError::NotFound(value.to_string()),
            OrderError::StaleIntent { .. } => ApiError::Conflict(value.to_string()),
            other => ApiError::Invalid(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(_) => ApiError::NotFound(value.to_string()),
            StoreError::Order(err) => ApiError::from(err),
            StoreError::Validation(_) | StoreError::InvalidData(_) => {
                ApiError::Invalid(value.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        tracing::warn!(%status, error, %message, "request failed");
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DropRequest {
    intent: Value,
    target: DropTarget,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/calendar/:year/:month", get(month_view))
        .route("/holidays/:year", get(holidays_for_year))
        .route("/holidays/:year/:month", get(holidays_for_month))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", get(get_task).patch(update_task).delete(delete_task))
        .route("/tasks/:id/toggle", post(toggle_task))
        .route("/drop", post(drop_task))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn month_view(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(params): Query<SearchParams>,
) -> Result<Json<MonthView>, ApiError> {
    let month = YearMonth::new(year, month)?;
    let tasks = {
        let guard = state.store.read();
        visible_tasks(guard.as_slice(), params.q.as_deref())
    };
    let today = Local::now().date_naive();
    Ok(Json(state.assembler.month_view(month, &tasks, today)))
}

async fn holidays_for_year(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Json<Vec<Holiday>> {
    Json(state.assembler.holidays().holidays_for_year(year).to_vec())
}

async fn holidays_for_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Vec<Holiday>>, ApiError> {
    let month = YearMonth::new(year, month)?;
    Ok(Json(state.assembler.holidays().holidays_for_month(month)))
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Task>> {
    let guard = state.store.read();
    Json(visible_tasks(guard.as_slice(), params.q.as_deref()))
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let found = state.store.read().find_task(&task_id)?;
    found
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("task {task_id} not found")))
}

async fn create_task(
    State(state): State<AppState>,
    Json(draft): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let store = state.store();
    let created = {
        let mut guard = store.write();
        guard.insert_task(draft)?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::invalid("patch does not change any field"));
    }
    let store = state.store();
    let updated = {
        let mut guard = store.write();
        guard.update_task(&task_id, &patch)?
    };
    Ok(Json(updated))
}

async fn toggle_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let store = state.store();
    let updated = {
        let mut guard = store.write();
        guard.toggle_completed(&task_id)?
    };
    Ok(Json(updated))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let store = state.store();
    {
        let mut guard = store.write();
        guard.remove_task(&task_id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn drop_task(
    State(state): State<AppState>,
    Json(request): Json<DropRequest>,
) -> Result<Json<DropPlan>, ApiError> {
    let intent = DragIntent::from_value(request.intent)?;
    let store = state.store();
    let plan = {
        let mut guard = store.write();
        guard.drop_task(&intent, &request.target)?
    };
    Ok(Json(plan))
}

fn visible_tasks(tasks: &[Task], query: Option<&str>) -> Vec<Task> {
    match query {
        Some(query) if !query.trim().is_empty() => {
            filter_tasks(tasks, query).into_iter().cloned().collect()
        }
        _ => tasks.to_vec(),
    }
}
