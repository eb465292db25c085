//! Shared plumbing for the three record kinds.
//!
//! Each write validates and renders its statement before the pool is
//! touched, so a bad request never opens a connection. Writes then run on
//! their own task: a client hanging up mid-request does not cancel a
//! statement already sent to the database.

use serde_json::{Map, Value};
use sqlx::FromRow;
use sqlx::postgres::PgRow;

use crate::db::update::{bind_params, build_update};
use crate::db::{BuildError, DbPool, PoolError, Statement, Table, UpdateOutcome};

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Invalid(#[from] BuildError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Run `work` to completion on its own task and wait for it.
async fn detached<T>(work: impl Future<Output = Result<T, sqlx::Error>> + Send + 'static) -> Result<T, RecordError>
where
    T: Send + 'static,
{
    Ok(tokio::spawn(work).await??)
}

/// Fetch every row for `sql` (no parameters).
pub(crate) async fn fetch_all<T>(db: &DbPool, sql: &str) -> Result<Vec<T>, RecordError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let pool = db.acquire().await?;
    Ok(sqlx::query_as::<_, T>(sql).fetch_all(&pool).await?)
}

/// Fetch the row keyed by `id` (`sql` takes `$1`).
pub(crate) async fn fetch_by_id<T>(db: &DbPool, sql: &str, id: i32, kind: &'static str) -> Result<T, RecordError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let pool = db.acquire().await?;
    sqlx::query_as::<_, T>(sql)
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(RecordError::NotFound(kind))
}

/// Run an insert-with-`RETURNING` statement and decode the returned row.
pub(crate) async fn insert_returning<T>(db: &DbPool, stmt: Statement) -> Result<T, RecordError>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    let pool = db.acquire().await?;
    let row = detached(async move {
        bind_params(sqlx::query(&stmt.sql), &stmt.params)
            .fetch_one(&pool)
            .await
    })
    .await?;
    Ok(T::from_row(&row)?)
}

/// Apply a partial update built from `body` to row `id`.
pub(crate) async fn update(
    db: &DbPool,
    table: &Table,
    id: i32,
    body: &Map<String, Value>,
    kind: &'static str,
) -> Result<(), RecordError> {
    let stmt = build_update(table, id, body)?;
    let pool = db.acquire().await?;
    match detached(async move { stmt.execute(&pool).await }).await? {
        UpdateOutcome::Updated => Ok(()),
        UpdateOutcome::NotFound => Err(RecordError::NotFound(kind)),
    }
}

/// Delete row `id`.
pub(crate) async fn delete(db: &DbPool, table: &Table, id: i32, kind: &'static str) -> Result<(), RecordError> {
    let stmt = Statement::delete(table, id);
    let pool = db.acquire().await?;
    match detached(async move { stmt.execute(&pool).await }).await? {
        UpdateOutcome::Updated => Ok(()),
        UpdateOutcome::NotFound => Err(RecordError::NotFound(kind)),
    }
}
