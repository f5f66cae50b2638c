//! Integration tests for edge cases.
//!
//! Tests boundary values, unicode handling, in-memory stores and
//! concurrent access through a shared pool.

mod common;

use common::TestEnv;
use std::thread;
use tasktrack::{CallContext, Store, StoreConfig, Task, User};

// =============================================================================
// Empty Store Operations
// =============================================================================

#[test]
fn test_empty_store_list_tasks() {
    let env = TestEnv::new();
    assert!(env.store.list_tasks(&env.ctx).unwrap().is_empty());
}

#[test]
fn test_empty_store_by_author() {
    let env = TestEnv::new();
    assert!(env.store.tasks_by_author(&env.ctx, 1).unwrap().is_empty());
}

#[test]
fn test_empty_store_by_label() {
    let env = TestEnv::new();
    assert!(env.store.tasks_by_label(&env.ctx, "Bug").unwrap().is_empty());
}

#[test]
fn test_empty_store_labels() {
    let env = TestEnv::new();
    assert!(env.store.list_labels(&env.ctx).unwrap().is_empty());
}

// =============================================================================
// Unicode and Special Characters
// =============================================================================

#[test]
fn test_unicode_fields() {
    let env = TestEnv::new();

    let ids = env
        .store
        .insert_tasks(&env.ctx, &[Task::new(1, 2, "Исправить баг 🐛", "描述: 修复错误")])
        .unwrap();

    let task = env.task(ids[0]);
    assert_eq!(task.title, "Исправить баг 🐛");
    assert_eq!(task.content, "描述: 修复错误");
}

#[test]
fn test_unicode_label_lookup() {
    let env = TestEnv::new();

    let id = env.create_task(1, 2, "Ошибка");
    let label = env.create_label("Баг");
    env.link_label(id, label);

    assert_eq!(env.store.tasks_by_label(&env.ctx, "Баг").unwrap().len(), 1);
}

#[test]
fn test_sql_metacharacters_stored_verbatim() {
    let env = TestEnv::new();

    let title = "'; DROP TABLE tasks; --";
    let id = env.create_task(1, 2, title);

    assert_eq!(env.task(id).title, title);
    assert_eq!(env.total_count(), 1);
    assert!(env.store.tasks_by_label(&env.ctx, title).unwrap().is_empty());
}

#[test]
fn test_whitespace_title_accepted() {
    let env = TestEnv::new();

    // Only emptiness is constrained.
    let id = env.create_task(1, 2, "   ");
    assert_eq!(env.task(id).title, "   ");
}

#[test]
fn test_large_content() {
    let env = TestEnv::new();

    let content = "x".repeat(1_000_000);
    let ids = env
        .store
        .insert_tasks(&env.ctx, &[Task::new(1, 2, "Big", content.clone())])
        .unwrap();

    assert_eq!(env.task(ids[0]).content.len(), content.len());
}

// =============================================================================
// Boundary Values
// =============================================================================

#[test]
fn test_max_closed_timestamp() {
    let env = TestEnv::new();

    let id = env.create_task(1, 2, "Far future");
    env.store
        .update_task(&env.ctx, id, &Task::new(1, 2, "Far future", "x").with_closed(i64::MAX))
        .unwrap();

    let task = env.task(id);
    assert_eq!(task.closed, i64::MAX);
    // Out of chrono's range
    assert!(task.closed_at().is_none());
}

#[test]
fn test_reopen_by_zeroing_closed() {
    let env = TestEnv::new();

    let id = env.create_task(1, 2, "Flip-flop");
    env.store
        .update_task(&env.ctx, id, &Task::new(1, 2, "Flip-flop", "x").with_closed(1_700_000_000))
        .unwrap();
    assert!(env.task(id).is_closed());

    env.store
        .update_task(&env.ctx, id, &Task::new(1, 2, "Flip-flop", "x"))
        .unwrap();
    assert!(!env.task(id).is_closed());
}

#[test]
fn test_many_tasks() {
    let env = TestEnv::new();

    let tasks: Vec<Task> = (0..500)
        .map(|i| Task::new(1 + i % 2, 2, format!("Task {}", i), "bulk"))
        .collect();
    env.store.insert_tasks(&env.ctx, &tasks).unwrap();

    assert_eq!(env.total_count(), 500);
    assert_eq!(env.store.tasks_by_author(&env.ctx, 1).unwrap().len(), 250);
}

// =============================================================================
// In-Memory Store
// =============================================================================

#[test]
fn test_in_memory_store() {
    let ctx = CallContext::background();
    let store = Store::open(&StoreConfig::in_memory(), &ctx).unwrap();

    store.insert_users(&ctx, &[User::new("alice")]).unwrap();
    let ids = store.insert_tasks(&ctx, &[Task::new(1, 1, "Mem", "ory")]).unwrap();

    // Every call sees the same database
    assert_eq!(store.get_task(&ctx, ids[0]).unwrap().unwrap().title, "Mem");
    assert_eq!(store.list_users(&ctx).unwrap().len(), 1);
}

#[test]
fn test_in_memory_stores_are_isolated() {
    let ctx = CallContext::background();
    let a = Store::open(&StoreConfig::in_memory(), &ctx).unwrap();
    let b = Store::open(&StoreConfig::in_memory(), &ctx).unwrap();

    a.insert_users(&ctx, &[User::new("alice")]).unwrap();

    assert!(b.list_users(&ctx).unwrap().is_empty());
}

// =============================================================================
// Concurrent Access
// =============================================================================

#[test]
fn test_concurrent_inserts() {
    let env = TestEnv::new();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = env.store.clone();
            thread::spawn(move || {
                let ctx = CallContext::background();
                for i in 0..25 {
                    let task = Task::new(1, 2, format!("w{} t{}", worker, i), "parallel");
                    store.insert_tasks(&ctx, &[task]).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let ids = env.task_ids();
    assert_eq!(ids.len(), 100);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_concurrent_readers_and_writer() {
    let env = TestEnv::new();
    env.create_task(1, 2, "Seed");

    let writer = {
        let store = env.store.clone();
        thread::spawn(move || {
            let ctx = CallContext::background();
            for i in 0..50 {
                store
                    .insert_tasks(&ctx, &[Task::new(2, 1, format!("Write {}", i), "w")])
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let store = env.store.clone();
            thread::spawn(move || {
                let ctx = CallContext::background();
                for _ in 0..50 {
                    let tasks = store.list_tasks(&ctx).unwrap();
                    assert!(!tasks.is_empty());
                    assert!(tasks.windows(2).all(|w| w[0].id < w[1].id));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(env.total_count(), 51);
}

#[test]
fn test_pool_connections_returned() {
    let env = TestEnv::new();

    for _ in 0..50 {
        env.store.list_tasks(&env.ctx).unwrap();
    }

    let state = env.store.pool().state();
    assert_eq!(state.idle_connections, state.connections);
}
