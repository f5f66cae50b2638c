//! Version-tracked schema migrations.
//!
//! The schema version lives in `PRAGMA user_version`. Each pending migration
//! runs in its own transaction together with the version bump, so a failed
//! migration leaves the database at the previous version.

use crate::error::StoreError;
use eyre::{Context, Result};
use rusqlite::Connection;

/// Ordered migrations; index + 1 is the version each one produces.
const MIGRATIONS: &[&str] = &[
    // v1: users, tasks, labels and the task-label link
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL CHECK (length(name) > 0)
    );

    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        opened INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        closed INTEGER NOT NULL DEFAULT 0 CHECK (closed >= 0),
        author_id INTEGER REFERENCES users(id),
        assigned_id INTEGER REFERENCES users(id),
        title TEXT NOT NULL CHECK (length(title) > 0),
        content TEXT NOT NULL CHECK (length(content) > 0)
    );
    CREATE INDEX IF NOT EXISTS idx_tasks_author ON tasks(author_id);
    CREATE INDEX IF NOT EXISTS idx_tasks_assigned ON tasks(assigned_id);

    CREATE TABLE IF NOT EXISTS labels (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_labels_name ON labels(name);

    CREATE TABLE IF NOT EXISTS tasks_labels (
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
        PRIMARY KEY (task_id, label_id)
    );
    CREATE INDEX IF NOT EXISTS idx_tasks_labels_label ON tasks_labels(label_id);
    "#,
];

/// Schema version this crate migrates to.
pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

/// Schema version recorded in the database.
pub fn current_version(conn: &Connection) -> Result<u32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("Failed to read schema version")
}

/// Apply every pending migration. Returns the resulting version.
pub fn run_migrations(conn: &mut Connection) -> Result<u32> {
    let found = current_version(conn)?;
    let latest = latest_version();

    if found > latest {
        return Err(eyre::eyre!(StoreError::UnsupportedSchemaVersion { found, latest }));
    }

    for (index, sql) in MIGRATIONS.iter().enumerate().skip(found as usize) {
        let version = index as u32 + 1;
        let tx = conn.transaction().context("Failed to begin migration")?;
        tx.execute_batch(sql)
            .with_context(|| format!("Failed to apply migration v{}", version))?;
        tx.execute_batch(&format!("PRAGMA user_version = {}", version))
            .with_context(|| format!("Failed to record schema version {}", version))?;
        tx.commit()
            .with_context(|| format!("Failed to commit migration v{}", version))?;
        log::info!("Applied schema migration v{}", version);
    }

    Ok(latest)
}
