use crate::dates::{self, DateError};
use crate::recurrence::{self, ParseError};
use crate::task::Task;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("task title is required")]
    MissingTitle,
    #[error("task id is required")]
    MissingId,
    #[error("task id '{0}' must be a number")]
    InvalidId(String),
    #[error(transparent)]
    Date(#[from] DateError),
    #[error("invalid repeat rule '{rule}': {source}")]
    Repeat {
        rule: String,
        #[source]
        source: ParseError,
    },
}

/// Field-level checks that do not depend on the current date.
///
/// An empty `date` is allowed here; it is filled in with today's date when
/// the task is scheduled.
pub fn validate_task(task: &Task) -> Result<(), TaskValidationError> {
    if task.title.trim().is_empty() {
        return Err(TaskValidationError::MissingTitle);
    }

    if !task.date.is_empty() {
        dates::parse_date(&task.date)?;
    }

    if task.is_recurring() {
        recurrence::validate(&task.repeat).map_err(|source| TaskValidationError::Repeat {
            rule: task.repeat.clone(),
            source,
        })?;
    }

    Ok(())
}

pub fn validate_task_id(id: &str) -> Result<i64, TaskValidationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(TaskValidationError::MissingId);
    }
    id.parse::<i64>()
        .map_err(|_| TaskValidationError::InvalidId(id.to_string()))
}
