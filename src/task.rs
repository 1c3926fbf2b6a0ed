use serde::{Deserialize, Serialize};

use crate::recurrence::{self, ParseError, RecurrenceRule};

/// A task record as exchanged with clients and kept by the store.
///
/// Every field travels as a string: `date` is `YYYYMMDD`, `repeat` is rule
/// text (empty for a one-shot task) and `id` is empty until the store
/// assigns one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub repeat: String,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_repeat(mut self, repeat: impl Into<String>) -> Self {
        self.repeat = repeat.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn is_recurring(&self) -> bool {
        !self.repeat.trim().is_empty()
    }

    /// The decoded repeat rule, `None` for a one-shot task.
    pub fn rule(&self) -> Result<Option<RecurrenceRule>, ParseError> {
        if self.is_recurring() {
            recurrence::parse(&self.repeat).map(Some)
        } else {
            Ok(None)
        }
    }
}
