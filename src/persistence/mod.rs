use crate::Task;
use crate::dates;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Page size used when a caller does not ask for one.
pub const DEFAULT_TASK_LIMIT: usize = 50;

/// Storage collaborator for task records.
///
/// Stores keep `date` and `repeat` verbatim; scheduling decisions are made
/// before a task reaches the store.
pub trait TaskStore: Send + Sync {
    /// Insert a new task and return its id. The task's own `id` is ignored.
    fn add_task(&self, task: &Task) -> PersistenceResult<i64>;
    fn get_task(&self, id: i64) -> PersistenceResult<Option<Task>>;
    /// Replace the stored fields of task `id`; `false` when no such task exists.
    fn update_task(&self, id: i64, task: &Task) -> PersistenceResult<bool>;
    /// `false` when no such task exists.
    fn delete_task(&self, id: i64) -> PersistenceResult<bool>;
    /// Tasks ordered by date, earliest first, at most `limit` of them.
    fn list_tasks(&self, limit: usize) -> PersistenceResult<Vec<Task>>;
}

/// Reject records that would break readers: every stored task has a title
/// and a `YYYYMMDD` date.
pub fn validate_record(task: &Task) -> PersistenceResult<()> {
    if task.title.trim().is_empty() {
        return Err(PersistenceError::InvalidData("task title is empty".into()));
    }
    dates::parse_date(&task.date).map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    Ok(())
}

#[cfg(feature = "sqlite")]
pub mod sqlite;
