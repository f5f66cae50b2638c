//! Connection pool for the SQLite backend.
//!
//! Every pooled connection is initialized with foreign keys enforced and a
//! busy timeout; file databases are switched to WAL so readers never wait on
//! the writer.

use crate::config::StoreConfig;
use crate::context::CallContext;
use eyre::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::fs;
use std::time::Duration;

/// A connection borrowed from the pool, returned on drop.
pub type PooledConn = r2d2::PooledConnection<SqliteConnectionManager>;

/// Shared handle to the connection pool. Clones share the same connections.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<SqliteConnectionManager>,
    busy_timeout: Duration,
}

impl DbPool {
    /// Open a pool for the configured database.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let busy_timeout = config.busy_timeout();

        let (manager, max_size) = if config.is_memory() {
            // Pooled memory connections share one cache; a single connection avoids SQLITE_LOCKED.
            (SqliteConnectionManager::memory(), 1)
        } else {
            if let Some(parent) = config.database.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
            }
            (SqliteConnectionManager::file(&config.database), config.max_connections.max(1))
        };

        let use_wal = !config.is_memory();
        let manager = manager.with_init(move |conn| init_connection(conn, busy_timeout, use_wal));

        let inner = Pool::builder()
            .max_size(max_size)
            .connection_timeout(config.connection_timeout())
            .build(manager)
            .with_context(|| format!("Failed to open database {}", config.database.display()))?;

        log::info!(
            "Opened pool for {} ({} connections max)",
            config.database.display(),
            max_size
        );

        Ok(Self { inner, busy_timeout })
    }

    /// Borrow a connection, waiting no longer than the call allows.
    pub fn get(&self, ctx: &CallContext) -> Result<PooledConn> {
        ctx.check()?;

        let checkout = match ctx.remaining() {
            Some(left) => self.inner.get_timeout(left),
            None => self.inner.get(),
        };
        let conn = match checkout {
            Ok(conn) => conn,
            Err(err) => {
                // A checkout that timed out on the caller's deadline reports the deadline.
                ctx.check()?;
                return Err(err).context("Failed to check out a database connection");
            }
        };

        let busy = ctx
            .remaining()
            .map_or(self.busy_timeout, |left| left.min(self.busy_timeout));
        conn.busy_timeout(busy).context("Failed to set busy timeout")?;

        Ok(conn)
    }

    /// Check that the database answers a trivial query.
    pub fn ping(&self, ctx: &CallContext) -> Result<()> {
        let conn = self.get(ctx)?;
        let one: i64 = conn
            .query_row("SELECT 1", [], |row| row.get(0))
            .context("Ping failed")?;
        if one != 1 {
            eyre::bail!("Ping returned unexpected value {}", one);
        }
        Ok(())
    }

    /// Current connection counts.
    pub fn state(&self) -> r2d2::State {
        self.inner.state()
    }

    pub fn max_size(&self) -> u32 {
        self.inner.max_size()
    }
}

fn init_connection(conn: &mut Connection, busy_timeout: Duration, use_wal: bool) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    if use_wal {
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    }
    Ok(())
}
