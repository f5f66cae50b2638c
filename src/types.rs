//! Core record types for the task tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for an unset user reference or an open task.
pub const UNSET: i64 = 0;

/// A person who can author or be assigned tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Database-assigned identifier (ignored on insert)
    #[serde(default)]
    pub id: i64,

    /// Display name, must be non-empty
    pub name: String,
}

impl User {
    /// Create a user record ready for insertion.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UNSET,
            name: name.into(),
        }
    }
}

/// A named tag attached to tasks through the `tasks_labels` link table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub id: i64,
    pub name: String,
}

/// The unit of work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// Database-assigned identifier (ignored on insert)
    #[serde(default)]
    pub id: i64,

    /// Epoch seconds when the task was created, set by the database
    #[serde(default)]
    pub opened: i64,

    /// Epoch seconds when the task was closed, 0 while open
    #[serde(default)]
    pub closed: i64,

    /// Authoring user, 0 when unset
    #[serde(default)]
    pub author_id: i64,

    /// Assigned user, 0 when unset
    #[serde(default)]
    pub assigned_id: i64,

    /// Short summary, must be non-empty
    pub title: String,

    /// Body text, must be non-empty
    pub content: String,
}

impl Task {
    /// Create a task record ready for insertion.
    pub fn new(author_id: i64, assigned_id: i64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: UNSET,
            opened: UNSET,
            closed: UNSET,
            author_id,
            assigned_id,
            title: title.into(),
            content: content.into(),
        }
    }

    /// Set the closed timestamp (epoch seconds).
    pub fn with_closed(mut self, closed: i64) -> Self {
        self.closed = closed;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed != UNSET
    }

    /// Creation time, if the record came from the database.
    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        if self.opened == UNSET {
            return None;
        }
        DateTime::from_timestamp(self.opened, 0)
    }

    /// Close time, if the task is closed.
    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        if !self.is_closed() {
            return None;
        }
        DateTime::from_timestamp(self.closed, 0)
    }
}

/// Map a record-level user reference to its column value.
///
/// The unset sentinel is stored as NULL so the foreign key only applies to
/// real users.
pub(crate) fn user_ref(id: i64) -> Option<i64> {
    (id != UNSET).then_some(id)
}
