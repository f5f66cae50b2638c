//! Shared test infrastructure for tasktrack integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use rusqlite::params;
use tasktrack::{CallContext, Store, StoreConfig, Task, User};
use tempfile::TempDir;

/// Test environment with automatic cleanup.
///
/// Starts with two users, "alice" (id 1) and "bob" (id 2).
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub store: Store,
    pub ctx: CallContext,
}

impl TestEnv {
    /// Create a new test environment backed by a database file.
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = StoreConfig::file(temp_dir.path().join("tasks.db"));
        let ctx = CallContext::background();
        let store = Store::open(&config, &ctx).expect("Failed to open store");
        store
            .insert_users(&ctx, &[User::new("alice"), User::new("bob")])
            .expect("Failed to seed users");

        Self { temp_dir, store, ctx }
    }

    /// Insert one task and return its id.
    pub fn create_task(&self, author: i64, assignee: i64, title: &str) -> i64 {
        let content = format!("{} content", title);
        self.store
            .insert_tasks(&self.ctx, &[Task::new(author, assignee, title, content)])
            .expect("Failed to insert task")[0]
    }

    /// Fetch a task that must exist.
    pub fn task(&self, id: i64) -> Task {
        self.store
            .get_task(&self.ctx, id)
            .expect("Failed to get task")
            .expect("Task should exist")
    }

    /// Create a label and return its id. Labels are not managed by the store.
    pub fn create_label(&self, name: &str) -> i64 {
        let conn = self.store.pool().get(&self.ctx).expect("Failed to get connection");
        conn.execute("INSERT INTO labels (name) VALUES (?1)", params![name])
            .expect("Failed to insert label");
        conn.last_insert_rowid()
    }

    /// Link a task to a label.
    pub fn link_label(&self, task_id: i64, label_id: i64) {
        let conn = self.store.pool().get(&self.ctx).expect("Failed to get connection");
        conn.execute(
            "INSERT INTO tasks_labels (task_id, label_id) VALUES (?1, ?2)",
            params![task_id, label_id],
        )
        .expect("Failed to link label");
    }

    /// Ids of all tasks, in listing order.
    pub fn task_ids(&self) -> Vec<i64> {
        self.store
            .list_tasks(&self.ctx)
            .expect("Failed to list tasks")
            .iter()
            .map(|t| t.id)
            .collect()
    }

    pub fn total_count(&self) -> usize {
        self.task_ids().len()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
