//! tasktrack: task and user persistence over a pooled SQLite backend.
//!
//! A thin repository: every operation borrows one connection from a shared
//! pool, runs one statement (or one per inserted record), and maps rows to
//! plain records. Schema setup is an explicit migration step that
//! [`Store::open`] runs once.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tasktrack::{CallContext, Store, StoreConfig, Task, User};
//!
//! let ctx = CallContext::background();
//! let store = Store::open(&StoreConfig::file("tasks.db"), &ctx).unwrap();
//!
//! store.insert_users(&ctx, &[User::new("alice"), User::new("bob")]).unwrap();
//! let ids = store
//!     .insert_tasks(&ctx, &[Task::new(1, 2, "Complete task", "complete task fast")])
//!     .unwrap();
//!
//! // Give up if the lookup takes longer than a second
//! let ctx = CallContext::with_timeout(Duration::from_secs(1));
//! let task = store.get_task(&ctx, ids[0]).unwrap().unwrap();
//! assert_eq!(task.title, "Complete task");
//!
//! store.delete_task(&ctx, ids[0]).unwrap();
//! ```

mod storage;

pub mod config;
pub mod context;
pub mod error;
pub mod migrate;
pub mod pool;
pub mod store;
pub mod types;

// Re-export public API
pub use config::StoreConfig;
pub use context::{CallContext, CancelToken};
pub use error::StoreError;
pub use pool::{DbPool, PooledConn};
pub use store::Store;
pub use types::{Label, Task, UNSET, User};
