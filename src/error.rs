//! Domain errors raised by the store.
//!
//! Failures coming from SQLite or the pool are passed through untouched as
//! the source of the returned `eyre::Report`; only conditions the store
//! itself detects get a variant here.

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Update or delete matched no task.
    TaskNotFound(i64),
    /// The caller cancelled the operation.
    Cancelled,
    /// The caller's deadline passed before the operation finished.
    DeadlineExceeded,
    /// The database was migrated by a newer version of this crate.
    UnsupportedSchemaVersion { found: u32, latest: u32 },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::TaskNotFound(id) => write!(f, "task not found: {}", id),
            StoreError::Cancelled => write!(f, "operation cancelled"),
            StoreError::DeadlineExceeded => write!(f, "deadline exceeded"),
            StoreError::UnsupportedSchemaVersion { found, latest } => {
                write!(
                    f,
                    "database schema version {} is newer than supported version {}",
                    found, latest
                )
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    /// Find the store error inside a report, if there is one.
    pub fn find(report: &eyre::Report) -> Option<&StoreError> {
        report.downcast_ref::<StoreError>()
    }

    /// True if the report is a `TaskNotFound`.
    pub fn is_not_found(report: &eyre::Report) -> bool {
        matches!(Self::find(report), Some(StoreError::TaskNotFound(_)))
    }
}
