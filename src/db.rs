use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use time::{Duration, OffsetDateTime};

use crate::error::AppError;
use crate::models::{CreateTodo, Todo, TodoStatus, UpdateTodo};

pub type DbPool = Arc<Mutex<Connection>>;

// AUTOINCREMENT keeps ids of deleted rows from being handed out again.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL CHECK (length(trim(title)) > 0),
        description TEXT,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'in-progress', 'completed')),
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL CHECK (updated_at >= created_at)
    );
";

const SELECT_TODO: &str =
    "SELECT id, title, description, status, created_at, updated_at FROM todos";

pub fn init_db(path: impl AsRef<Path>) -> Result<DbPool> {
    setup(Connection::open(path)?)
}

pub fn init_in_memory() -> Result<DbPool> {
    setup(Connection::open_in_memory()?)
}

fn setup(conn: Connection) -> Result<DbPool> {
    conn.execute_batch(SCHEMA)?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn lock(pool: &DbPool) -> Result<MutexGuard<'_, Connection>, AppError> {
    pool.lock()
        .map_err(|_| AppError::Database("connection lock poisoned".to_string()))
}

impl ToSql for TodoStatus {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TodoStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

fn to_nanos(ts: OffsetDateTime) -> Result<i64, AppError> {
    i64::try_from(ts.unix_timestamp_nanos())
        .map_err(|_| AppError::Database(format!("timestamp {ts} out of range")))
}

fn timestamp(row: &Row<'_>, idx: usize) -> Result<OffsetDateTime> {
    let nanos: i64 = row.get(idx)?;
    OffsetDateTime::from_unix_timestamp_nanos(nanos.into())
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(err)))
}

fn todo_from_row(row: &Row<'_>) -> Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        created_at: timestamp(row, 4)?,
        updated_at: timestamp(row, 5)?,
    })
}

fn find_todo(conn: &Connection, id: i64) -> Result<Option<Todo>, AppError> {
    let mut stmt = conn.prepare(&format!("{SELECT_TODO} WHERE id = ?1"))?;
    Ok(stmt.query_row([id], todo_from_row).optional()?)
}

/// `updated_at` must move forward on every mutation, even when the clock
/// has not advanced since the previous write.
fn next_updated_at(previous: OffsetDateTime) -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

pub fn list_todos(pool: &DbPool) -> Result<Vec<Todo>, AppError> {
    let conn = lock(pool)?;
    let mut stmt = conn.prepare(&format!("{SELECT_TODO} ORDER BY id ASC"))?;
    let todos = stmt
        .query_map([], todo_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(todos)
}

pub fn get_todo(pool: &DbPool, id: i64) -> Result<Todo, AppError> {
    let conn = lock(pool)?;
    find_todo(&conn, id)?.ok_or(AppError::NotFound)
}

pub fn create_todo(pool: &DbPool, req: &CreateTodo) -> Result<Todo, AppError> {
    let fields = req.validate().map_err(AppError::Validation)?;
    let now = to_nanos(OffsetDateTime::now_utc())?;

    let conn = lock(pool)?;
    conn.execute(
        "INSERT INTO todos (title, description, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![fields.title, fields.description, fields.status, now],
    )?;
    let id = conn.last_insert_rowid();

    find_todo(&conn, id)?.ok_or(AppError::NotFound)
}

pub fn update_todo(pool: &DbPool, id: i64, req: &UpdateTodo) -> Result<Todo, AppError> {
    let mut conn = lock(pool)?;
    let tx = conn.transaction()?;

    let current = find_todo(&tx, id)?.ok_or(AppError::NotFound)?;
    let fields = req.merge_onto(&current).map_err(AppError::Validation)?;
    let updated_at = to_nanos(next_updated_at(current.updated_at))?;

    tx.execute(
        "UPDATE todos SET title = ?1, description = ?2, status = ?3, updated_at = ?4
         WHERE id = ?5",
        params![fields.title, fields.description, fields.status, updated_at, id],
    )?;
    let todo = find_todo(&tx, id)?.ok_or(AppError::NotFound)?;
    tx.commit()?;

    Ok(todo)
}

pub fn delete_todo(pool: &DbPool, id: i64) -> Result<i64, AppError> {
    let conn = lock(pool)?;
    let rows = conn.execute("DELETE FROM todos WHERE id = ?1", [id])?;
    if rows == 0 {
        return Err(AppError::NotFound);
    }
    Ok(id)
}
