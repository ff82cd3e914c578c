//! Query execution interface

use crate::{Error, Result, Row};
use serde::de::DeserializeOwned;
use sqlx::sqlite::{SqliteArguments, SqliteQueryResult};
use sqlx::Sqlite;
use squeeb_core::{Query, QueryBuilder, Value};
use std::future::Future;
use tracing::{debug, error};

/// Something that can run a built [`Query`]: the [`Database`](crate::Database)
/// pool or an open [`Transaction`](crate::Transaction).
///
/// Every method refuses a query that carries a build error or has no text.
pub trait Executor: Send {
    /// Execute a statement and return the number of affected rows
    fn execute(&mut self, query: &Query) -> impl Future<Output = Result<u64>> + Send;

    /// Execute an INSERT and return the rowid of the inserted row
    fn execute_insert(&mut self, query: &Query) -> impl Future<Output = Result<i64>> + Send;

    /// Execute a query that returns multiple rows
    fn fetch_all(&mut self, query: &Query) -> impl Future<Output = Result<Vec<Row>>> + Send;

    /// Execute a query that returns an optional row
    fn fetch_optional(
        &mut self,
        query: &Query,
    ) -> impl Future<Output = Result<Option<Row>>> + Send;

    /// Build and execute a statement
    fn run<B>(&mut self, builder: &B) -> impl Future<Output = Result<u64>> + Send
    where
        B: QueryBuilder + ?Sized,
    {
        let query = builder.build();
        async move { self.execute(&query).await }
    }

    /// Fetch every row, deserialized into `T`
    fn fetch_all_as<T>(&mut self, query: &Query) -> impl Future<Output = Result<Vec<T>>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            let rows = self.fetch_all(query).await?;
            rows.iter().map(Row::deserialize).collect()
        }
    }

    /// Fetch exactly one row, deserialized into `T`
    fn fetch_one_as<T>(&mut self, query: &Query) -> impl Future<Output = Result<T>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            match self.fetch_optional(query).await? {
                Some(row) => row.deserialize(),
                None => Err(Error::Database(sqlx::Error::RowNotFound)),
            }
        }
    }
}

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// The SQL text of `query`, or the reason it must not run
fn checked(query: &Query) -> Result<&str> {
    if let Some(build_error) = query.error() {
        error!(error = %build_error, "QUERY BUILD ERROR");
        return Err(Error::Build(build_error.clone()));
    }
    if query.text().trim().is_empty() {
        return Err(Error::EmptyStatement);
    }
    Ok(query.text())
}

fn bind_values<'q>(mut query: SqliteQuery<'q>, args: &'q [Value]) -> SqliteQuery<'q> {
    for arg in args {
        query = match arg {
            Value::Null => query.bind(None::<i64>),
            Value::Bool(b) => query.bind(*b),
            Value::Integer(i) => query.bind(*i),
            Value::Real(r) => query.bind(*r),
            Value::Text(s) => query.bind(s.as_str()),
            Value::Blob(b) => query.bind(b.as_slice()),
        };
    }
    query
}

pub(crate) async fn execute_with<'c, E>(executor: E, query: &Query) -> Result<SqliteQueryResult>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let sql = checked(query)?;
    debug!(statement = %sql, param_count = query.args().len(), "Executing statement");

    let result = bind_values(sqlx::query(sql), query.args())
        .execute(executor)
        .await?;

    debug!(rows_affected = result.rows_affected(), "Statement executed");
    Ok(result)
}

pub(crate) async fn fetch_all_with<'c, E>(executor: E, query: &Query) -> Result<Vec<Row>>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let sql = checked(query)?;
    debug!(query = %sql, param_count = query.args().len(), "Executing query");

    let rows = bind_values(sqlx::query(sql), query.args())
        .fetch_all(executor)
        .await?;

    debug!(row_count = rows.len(), "Query executed");
    Ok(rows.iter().map(Row::from_sqlite).collect())
}

pub(crate) async fn fetch_optional_with<'c, E>(executor: E, query: &Query) -> Result<Option<Row>>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let sql = checked(query)?;
    debug!(query = %sql, param_count = query.args().len(), "Executing query");

    let row = bind_values(sqlx::query(sql), query.args())
        .fetch_optional(executor)
        .await?;

    Ok(row.as_ref().map(Row::from_sqlite))
}
