pub mod config;
pub mod dates;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod recurrence;
pub mod schedule;
pub mod task;
pub mod task_validation;

pub use config::{AppConfig, ConfigError};
pub use dates::{CalendarDate, DateError, format_date, parse_date};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteTaskStore;
pub use persistence::{PersistenceError, TaskStore};
pub use recurrence::{
    ComputeError, ParseError, RecurrenceRule, ScheduleQuery, next_occurrence, parse, validate,
};
pub use schedule::{Completion, ScheduleError, next_date};
pub use task::Task;
pub use task_validation::TaskValidationError;
