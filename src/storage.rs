//! SQL layer: stateless functions mapping records to statements and rows
//! back to records.
//!
//! Each function runs against a borrowed connection and assumes the schema
//! from [`crate::migrate`] is in place.

use crate::context::CallContext;
use crate::error::StoreError;
use crate::types::{Label, Task, User, user_ref};
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Params, Row, params};

/// Task columns in `Task` field order. User references read NULL as 0.
const TASK_COLUMNS: &str =
    "t.id, t.opened, t.closed, COALESCE(t.author_id, 0), COALESCE(t.assigned_id, 0), t.title, t.content";

/// Insert tasks one statement at a time. Returns the generated ids in input order.
///
/// `id`, `opened` and `closed` on the input are ignored. There is no
/// enclosing transaction: if a later insert fails, earlier ones stay.
pub fn insert_tasks(conn: &Connection, ctx: &CallContext, tasks: &[Task]) -> Result<Vec<i64>> {
    let mut stmt = conn
        .prepare("INSERT INTO tasks (author_id, assigned_id, title, content) VALUES (?1, ?2, ?3, ?4)")
        .context("Failed to prepare task insert")?;

    let mut ids = Vec::with_capacity(tasks.len());
    for task in tasks {
        ctx.check()?;
        let id = stmt
            .insert(params![
                user_ref(task.author_id),
                user_ref(task.assigned_id),
                task.title,
                task.content,
            ])
            .with_context(|| format!("Failed to insert task '{}'", task.title))?;
        ids.push(id);
    }

    Ok(ids)
}

/// Insert users. Returns the generated ids in input order.
pub fn insert_users(conn: &Connection, ctx: &CallContext, users: &[User]) -> Result<Vec<i64>> {
    let mut stmt = conn
        .prepare("INSERT INTO users (name) VALUES (?1)")
        .context("Failed to prepare user insert")?;

    let mut ids = Vec::with_capacity(users.len());
    for user in users {
        ctx.check()?;
        let id = stmt
            .insert(params![user.name])
            .with_context(|| format!("Failed to insert user '{}'", user.name))?;
        ids.push(id);
    }

    Ok(ids)
}

/// All tasks, ascending by id.
pub fn list_tasks(conn: &Connection, ctx: &CallContext) -> Result<Vec<Task>> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks t ORDER BY t.id");
    query_tasks(conn, ctx, &sql, [])
}

/// A single task, or `None` if no task has this id.
pub fn get_task(conn: &Connection, ctx: &CallContext, id: i64) -> Result<Option<Task>> {
    ctx.check()?;
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?1");
    conn.query_row(&sql, params![id], row_to_task)
        .optional()
        .with_context(|| format!("Failed to get task {}", id))
}

/// Tasks written by `author_id`, ascending by id. An id of 0 selects tasks with no author.
pub fn tasks_by_author(conn: &Connection, ctx: &CallContext, author_id: i64) -> Result<Vec<Task>> {
    // IS matches the NULL stored for an unset author.
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.author_id IS ?1 ORDER BY t.id");
    query_tasks(conn, ctx, &sql, params![user_ref(author_id)])
}

/// Tasks linked to a label with exactly this name, ascending by id.
pub fn tasks_by_label(conn: &Connection, ctx: &CallContext, label: &str) -> Result<Vec<Task>> {
    // DISTINCT: several labels may share a name.
    let sql = format!(
        r#"
        SELECT DISTINCT {TASK_COLUMNS}
        FROM tasks t
        JOIN tasks_labels tl ON tl.task_id = t.id
        JOIN labels l ON l.id = tl.label_id
        WHERE l.name = ?1
        ORDER BY t.id
        "#
    );
    query_tasks(conn, ctx, &sql, params![label])
}

/// Replace author, assignee, closed, title and content of a task.
pub fn update_task(conn: &Connection, ctx: &CallContext, id: i64, task: &Task) -> Result<()> {
    ctx.check()?;
    let changed = conn
        .execute(
            r#"
            UPDATE tasks
            SET author_id = ?1, assigned_id = ?2, closed = ?3, title = ?4, content = ?5
            WHERE id = ?6
            "#,
            params![
                user_ref(task.author_id),
                user_ref(task.assigned_id),
                task.closed,
                task.title,
                task.content,
                id,
            ],
        )
        .with_context(|| format!("Failed to update task {}", id))?;

    if changed == 0 {
        return Err(eyre::eyre!(StoreError::TaskNotFound(id)));
    }
    Ok(())
}

/// Delete a task and its label links.
pub fn delete_task(conn: &Connection, ctx: &CallContext, id: i64) -> Result<()> {
    ctx.check()?;
    let changed = conn
        .execute("DELETE FROM tasks WHERE id = ?1", params![id])
        .with_context(|| format!("Failed to delete task {}", id))?;

    if changed == 0 {
        return Err(eyre::eyre!(StoreError::TaskNotFound(id)));
    }
    Ok(())
}

/// All users, ascending by id.
pub fn list_users(conn: &Connection, ctx: &CallContext) -> Result<Vec<User>> {
    ctx.check()?;
    let mut stmt = conn
        .prepare("SELECT id, name FROM users ORDER BY id")
        .context("Failed to prepare user query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .context("Failed to query users")?;

    collect_rows(ctx, rows)
}

/// All labels, ascending by id.
pub fn list_labels(conn: &Connection, ctx: &CallContext) -> Result<Vec<Label>> {
    ctx.check()?;
    let mut stmt = conn
        .prepare("SELECT id, name FROM labels ORDER BY id")
        .context("Failed to prepare label query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Label {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .context("Failed to query labels")?;

    collect_rows(ctx, rows)
}

fn query_tasks<P: Params>(conn: &Connection, ctx: &CallContext, sql: &str, params: P) -> Result<Vec<Task>> {
    ctx.check()?;
    let mut stmt = conn.prepare(sql).context("Failed to prepare task query")?;
    let rows = stmt.query_map(params, row_to_task).context("Failed to query tasks")?;
    collect_rows(ctx, rows)
}

/// Drain mapped rows, stopping on the first decode error or when the call ends.
fn collect_rows<T>(ctx: &CallContext, rows: impl Iterator<Item = rusqlite::Result<T>>) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        ctx.check()?;
        out.push(row.context("Failed to decode row")?);
    }
    Ok(out)
}

/// Convert a row selected with `TASK_COLUMNS` to a Task.
fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        opened: row.get(1)?,
        closed: row.get(2)?,
        author_id: row.get(3)?,
        assigned_id: row.get(4)?,
        title: row.get(5)?,
        content: row.get(6)?,
    })
}
