use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::persistence::{DEFAULT_TASK_LIMIT, PersistenceError, TaskStore};
use crate::schedule::{self, Completion, ScheduleError};
use crate::task_validation::validate_task_id;
use crate::{Task, dates};

type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn TaskStore>,
    clock: Clock,
    task_limit: usize,
}

impl AppState {
    /// State backed by `store`, with "today" taken from the local clock.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            clock: Arc::new(|| Local::now().date_naive()),
            task_limit: DEFAULT_TASK_LIMIT,
        }
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_task_limit(mut self, task_limit: usize) -> Self {
        self.task_limit = task_limit;
        self
    }

    fn store(&self) -> &dyn TaskStore {
        self.store.as_ref()
    }

    fn today(&self) -> NaiveDate {
        (self.clock)()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        match value {
            ScheduleError::TaskNotFound(_) => ApiError::NotFound(value.to_string()),
            ScheduleError::Store(PersistenceError::InvalidData(message)) => {
                ApiError::Invalid(message)
            }
            ScheduleError::Store(err) => {
                error!(error = %err, "task store failure");
                ApiError::Internal("task storage failed".to_string())
            }
            ScheduleError::Compute(err @ crate::ComputeError::Unreachable { .. }) => {
                ApiError::Internal(err.to_string())
            }
            other => ApiError::Invalid(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::Invalid(format!("invalid JSON payload: {}", value.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        warn!(status = status.as_u16(), %error, "request failed");
        (status, Json(ErrorBody { error })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct NextDateParams {
    #[serde(default)]
    now: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    repeat: String,
}

#[derive(Debug, Deserialize)]
struct IdParams {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/nextdate", get(next_date))
        .route(
            "/api/task",
            get(get_task)
                .post(create_task)
                .put(update_task)
                .delete(delete_task),
        )
        .route("/api/tasks", get(list_tasks))
        .route("/api/task/done", post(complete_task))
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

/// Plain-text endpoint: the next date on success, the error text on failure.
async fn next_date(Query(params): Query<NextDateParams>) -> Response {
    let now = match dates::parse_date(&params.now) {
        Ok(now) => now,
        Err(err) => return (StatusCode::BAD_REQUEST, format!("invalid now: {err}")).into_response(),
    };
    match schedule::next_date(now, &params.date, &params.repeat) {
        Ok(next) => next.into_response(),
        Err(err) => {
            warn!(date = %params.date, repeat = %params.repeat, error = %err, "next date rejected");
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
    }
}

async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<Task>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(task) = payload?;
    let id = schedule::add_task(state.store(), task, state.today())?;
    Ok(Json(json!({ "id": id.to_string() })))
}

async fn get_task(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
) -> Result<Json<Task>, ApiError> {
    let id = validate_task_id(&params.id).map_err(|err| ApiError::invalid(err.to_string()))?;
    let task = schedule::get_task(state.store(), id)?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<AppState>,
    payload: Result<Json<Task>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(task) = payload?;
    schedule::update_task(state.store(), task, state.today())?;
    Ok(Json(json!({})))
}

async fn delete_task(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
) -> Result<Json<Value>, ApiError> {
    let id = validate_task_id(&params.id).map_err(|err| ApiError::invalid(err.to_string()))?;
    schedule::delete_task(state.store(), id)?;
    Ok(Json(json!({})))
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<TaskList>, ApiError> {
    let limit = match params.limit.as_deref().map(str::trim) {
        None | Some("") => state.task_limit,
        Some(raw) => match raw.parse::<usize>() {
            Ok(limit) if limit > 0 => limit,
            _ => return Err(ApiError::invalid(format!("invalid limit '{raw}'"))),
        },
    };
    let tasks = state
        .store()
        .list_tasks(limit)
        .map_err(|err| ApiError::from(ScheduleError::from(err)))?;
    Ok(Json(TaskList { tasks }))
}

async fn complete_task(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
) -> Result<Json<Value>, ApiError> {
    let id = validate_task_id(&params.id).map_err(|err| ApiError::invalid(err.to_string()))?;
    match schedule::complete_task(state.store(), id, state.today())? {
        Completion::Removed => info!(id, "one-shot task completed"),
        Completion::Rescheduled(date) => info!(id, %date, "recurring task completed"),
    }
    Ok(Json(json!({})))
}
