//! Store configuration.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Path value selecting a private in-memory database.
pub const MEMORY_DATABASE: &str = ":memory:";

const DEFAULT_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Settings for opening a [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file, or `:memory:`
    pub database: PathBuf,

    /// Upper bound on pooled connections
    pub max_connections: u32,

    /// How long a pool checkout may wait for a free connection
    pub connection_timeout_ms: u64,

    /// How long a statement waits on a locked database
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connection_timeout_ms: DEFAULT_CONNECTION_TIMEOUT_MS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// Config for a database file at `path`, other settings defaulted.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            database: path.into(),
            ..Self::default()
        }
    }

    /// Config for an in-memory database.
    pub fn in_memory() -> Self {
        Self::file(MEMORY_DATABASE)
    }

    /// Load config from a YAML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self =
            serde_yaml::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn is_memory(&self) -> bool {
        self.database.as_os_str() == MEMORY_DATABASE
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// `<data_local_dir>/tasktrack/tasktrack.db`, falling back to the working directory.
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasktrack")
        .join("tasktrack.db")
}
