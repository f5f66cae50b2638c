//! High-level store API.

use crate::config::StoreConfig;
use crate::context::CallContext;
use crate::error::StoreError;
use crate::migrate::run_migrations;
use crate::pool::DbPool;
use crate::storage;
use crate::types::{Label, Task, User};
use eyre::{Context, Result};

/// Task and user repository over a shared connection pool.
///
/// Cheap to clone; clones share the pool and may be used from any thread.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    /// Open the configured database and bring its schema up to date.
    pub fn open(config: &StoreConfig, ctx: &CallContext) -> Result<Self> {
        let pool = DbPool::open(config)?;
        let store = Self { pool };
        store.migrate(ctx)?;
        Ok(store)
    }

    /// Wrap an existing pool without touching the schema.
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for callers that need raw SQL access.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Apply pending schema migrations. Returns the schema version.
    pub fn migrate(&self, ctx: &CallContext) -> Result<u32> {
        let mut conn = self.pool.get(ctx)?;
        run_migrations(&mut conn).context("Failed to migrate schema")
    }

    /// Check that the database is reachable.
    pub fn ping(&self, ctx: &CallContext) -> Result<()> {
        self.pool.ping(ctx)
    }

    /// Insert tasks. Returns their generated ids in input order.
    pub fn insert_tasks(&self, ctx: &CallContext, tasks: &[Task]) -> Result<Vec<i64>> {
        let conn = self.pool.get(ctx)?;
        let ids = storage::insert_tasks(&conn, ctx, tasks).map_err(|e| log_cancel(e, "insert tasks"))?;
        log::debug!("Inserted {} tasks", ids.len());
        Ok(ids)
    }

    /// Insert users. Returns their generated ids in input order.
    pub fn insert_users(&self, ctx: &CallContext, users: &[User]) -> Result<Vec<i64>> {
        let conn = self.pool.get(ctx)?;
        let ids = storage::insert_users(&conn, ctx, users).map_err(|e| log_cancel(e, "insert users"))?;
        log::debug!("Inserted {} users", ids.len());
        Ok(ids)
    }

    /// All tasks, ascending by id.
    pub fn list_tasks(&self, ctx: &CallContext) -> Result<Vec<Task>> {
        let conn = self.pool.get(ctx)?;
        let tasks = storage::list_tasks(&conn, ctx).map_err(|e| log_cancel(e, "list tasks"))?;
        log::debug!("Listed {} tasks", tasks.len());
        Ok(tasks)
    }

    /// Get a task by id.
    pub fn get_task(&self, ctx: &CallContext, id: i64) -> Result<Option<Task>> {
        let conn = self.pool.get(ctx)?;
        storage::get_task(&conn, ctx, id).map_err(|e| log_cancel(e, "get task"))
    }

    /// Tasks written by a user.
    pub fn tasks_by_author(&self, ctx: &CallContext, author_id: i64) -> Result<Vec<Task>> {
        let conn = self.pool.get(ctx)?;
        let tasks = storage::tasks_by_author(&conn, ctx, author_id).map_err(|e| log_cancel(e, "list tasks by author"))?;
        log::debug!("Found {} tasks by author {}", tasks.len(), author_id);
        Ok(tasks)
    }

    /// Tasks carrying a label with exactly this name.
    pub fn tasks_by_label(&self, ctx: &CallContext, label: &str) -> Result<Vec<Task>> {
        let conn = self.pool.get(ctx)?;
        let tasks = storage::tasks_by_label(&conn, ctx, label).map_err(|e| log_cancel(e, "list tasks by label"))?;
        log::debug!("Found {} tasks labelled '{}'", tasks.len(), label);
        Ok(tasks)
    }

    /// Replace a task's author, assignee, closed time, title and content.
    ///
    /// Fails with [`StoreError::TaskNotFound`] if no task has this id.
    pub fn update_task(&self, ctx: &CallContext, id: i64, task: &Task) -> Result<()> {
        let conn = self.pool.get(ctx)?;
        storage::update_task(&conn, ctx, id, task).map_err(|e| log_missing(e, "update", id))?;
        log::debug!("Updated task {}", id);
        Ok(())
    }

    /// Delete a task.
    ///
    /// Fails with [`StoreError::TaskNotFound`] if no task has this id.
    pub fn delete_task(&self, ctx: &CallContext, id: i64) -> Result<()> {
        let conn = self.pool.get(ctx)?;
        storage::delete_task(&conn, ctx, id).map_err(|e| log_missing(e, "delete", id))?;
        log::debug!("Deleted task {}", id);
        Ok(())
    }

    /// All users, ascending by id.
    pub fn list_users(&self, ctx: &CallContext) -> Result<Vec<User>> {
        let conn = self.pool.get(ctx)?;
        storage::list_users(&conn, ctx).map_err(|e| log_cancel(e, "list users"))
    }

    /// All labels, ascending by id.
    pub fn list_labels(&self, ctx: &CallContext) -> Result<Vec<Label>> {
        let conn = self.pool.get(ctx)?;
        storage::list_labels(&conn, ctx).map_err(|e| log_cancel(e, "list labels"))
    }
}

fn log_cancel(err: eyre::Report, op: &str) -> eyre::Report {
    let stopped = StoreError::find(&err)
        .filter(|cause| matches!(cause, StoreError::Cancelled | StoreError::DeadlineExceeded));
    if let Some(cause) = stopped {
        log::warn!("Stopped {}: {}", op, cause);
    }
    err
}

fn log_missing(err: eyre::Report, op: &str, id: i64) -> eyre::Report {
    if StoreError::is_not_found(&err) {
        log::warn!("Cannot {} task {}: not found", op, id);
        return err;
    }
    log_cancel(err, op)
}
