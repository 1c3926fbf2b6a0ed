//! Task scheduling on top of the successor engine: the boundary call behind
//! `/api/nextdate`, date normalisation for new and edited tasks, and task
//! completion.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::dates::{self, DateError};
use crate::persistence::{PersistenceError, TaskStore};
use crate::recurrence::{self, ComputeError, ParseError};
use crate::task::Task;
use crate::task_validation::{self, TaskValidationError};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Date(#[from] DateError),
    #[error("repeat rule is empty")]
    EmptyRule,
    #[error(transparent)]
    Rule(#[from] ParseError),
    #[error(transparent)]
    Compute(#[from] ComputeError),
    #[error(transparent)]
    Validation(#[from] TaskValidationError),
    #[error(transparent)]
    Store(#[from] PersistenceError),
    #[error("task {0} not found")]
    TaskNotFound(i64),
}

/// What completing a task did to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// One-shot task, deleted from the store.
    Removed,
    /// Recurring task, moved to the contained `YYYYMMDD` date.
    Rescheduled(String),
}

/// Next occurrence of `repeat` anchored at `date`, strictly after `now`.
///
/// `date` and the result use the `YYYYMMDD` wire format.
pub fn next_date(now: NaiveDate, date: &str, repeat: &str) -> Result<String, ScheduleError> {
    let anchor = dates::parse_date(date)?;
    if repeat.trim().is_empty() {
        return Err(ScheduleError::EmptyRule);
    }
    let rule = recurrence::parse(repeat)?;
    let next = recurrence::next_occurrence(anchor, &rule, now)?;
    Ok(dates::format_date(next))
}

/// Validate a task and settle its date against `today`.
///
/// An empty date becomes today. A date in the past becomes today for a
/// one-shot task, or the rule's next occurrence after today for a recurring
/// one. Today and future dates are kept.
pub fn normalize_task(mut task: Task, today: NaiveDate) -> Result<Task, ScheduleError> {
    task_validation::validate_task(&task)?;

    if task.date.is_empty() {
        task.date = dates::format_date(today);
        return Ok(task);
    }

    let date = dates::parse_date(&task.date)?;
    if date < today {
        task.date = match task.rule()? {
            Some(rule) => dates::format_date(recurrence::next_occurrence(date, &rule, today)?),
            None => dates::format_date(today),
        };
        debug!(title = %task.title, date = %task.date, "moved past-due task date");
    }
    Ok(task)
}

pub fn add_task(store: &dyn TaskStore, task: Task, today: NaiveDate) -> Result<i64, ScheduleError> {
    let task = normalize_task(task, today)?;
    let id = store.add_task(&task)?;
    info!(id, date = %task.date, "task added");
    Ok(id)
}

pub fn update_task(store: &dyn TaskStore, task: Task, today: NaiveDate) -> Result<(), ScheduleError> {
    let id = task_validation::validate_task_id(&task.id)?;
    let task = normalize_task(task, today)?;
    if !store.update_task(id, &task)? {
        return Err(ScheduleError::TaskNotFound(id));
    }
    info!(id, date = %task.date, "task updated");
    Ok(())
}

pub fn delete_task(store: &dyn TaskStore, id: i64) -> Result<(), ScheduleError> {
    if !store.delete_task(id)? {
        return Err(ScheduleError::TaskNotFound(id));
    }
    info!(id, "task deleted");
    Ok(())
}

pub fn get_task(store: &dyn TaskStore, id: i64) -> Result<Task, ScheduleError> {
    store.get_task(id)?.ok_or(ScheduleError::TaskNotFound(id))
}

/// Mark a task done: delete a one-shot task, or move a recurring task to its
/// next occurrence after both `today` and the date being completed.
pub fn complete_task(
    store: &dyn TaskStore,
    id: i64,
    today: NaiveDate,
) -> Result<Completion, ScheduleError> {
    let mut task = get_task(store, id)?;

    let Some(rule) = task.rule()? else {
        delete_task(store, id)?;
        return Ok(Completion::Removed);
    };

    // The stored date is the occurrence being completed.
    let anchor = dates::parse_date(&task.date)?;
    let done_through = anchor.max(today);
    let next = dates::format_date(recurrence::next_occurrence(anchor, &rule, done_through)?);
    task.date = next.clone();
    if !store.update_task(id, &task)? {
        return Err(ScheduleError::TaskNotFound(id));
    }
    info!(id, date = %next, "recurring task rescheduled");
    Ok(Completion::Rescheduled(next))
}
