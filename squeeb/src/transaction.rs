//! Explicit transactions

use crate::executor::{execute_with, fetch_all_with, fetch_optional_with};
use crate::{Database, Error, Executor, Result, Row};
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool};
use squeeb_core::{
    BeginTransaction, CommitTransaction, Query, QueryBuilder, ReleaseSavepoint,
    RollbackTransaction, Savepoint, TransactionBehavior,
};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

/// A boxed future borrowing from `'a`, as returned by [`transaction`] closures
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A transaction holding one pooled connection until it is committed or
/// rolled back.
///
/// Dropping an unfinished transaction rolls it back. For an in-memory
/// database the pool has a single connection, so while a transaction is open
/// every statement must go through it.
pub struct Transaction {
    database: String,
    conn: Option<PoolConnection<Sqlite>>,
}

impl Transaction {
    pub(crate) async fn begin(
        pool: &SqlitePool,
        database: &str,
        behavior: Option<TransactionBehavior>,
    ) -> Result<Self> {
        let mut conn = pool.acquire().await?;
        let begin = match behavior {
            Some(behavior) => BeginTransaction::with_behavior(behavior),
            None => BeginTransaction::new(),
        };
        execute_with(&mut *conn, &begin.build()).await?;
        debug!(database = %database, ?behavior, "Transaction started");

        Ok(Self {
            database: database.to_string(),
            conn: Some(conn),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.conn.is_none()
    }

    pub async fn commit(mut self) -> Result<()> {
        self.finish(&CommitTransaction::new().build()).await?;
        debug!(database = %self.database, "Transaction committed");
        Ok(())
    }

    pub async fn rollback(mut self) -> Result<()> {
        self.finish(&RollbackTransaction::new().build()).await?;
        debug!(database = %self.database, "Transaction rolled back");
        Ok(())
    }

    pub async fn savepoint(&mut self, name: &str) -> Result<()> {
        self.execute(&Savepoint::new(name).build()).await?;
        Ok(())
    }

    pub async fn release_savepoint(&mut self, name: &str) -> Result<()> {
        self.execute(&ReleaseSavepoint::new(name).build()).await?;
        Ok(())
    }

    pub async fn rollback_to_savepoint(&mut self, name: &str) -> Result<()> {
        self.execute(&RollbackTransaction::to_savepoint(name).build())
            .await?;
        Ok(())
    }

    fn connection(&mut self) -> Result<&mut PoolConnection<Sqlite>> {
        self.conn.as_mut().ok_or(Error::TransactionFinished)
    }

    // The connection is released only once the statement succeeds; on failure
    // drop still rolls back.
    async fn finish(&mut self, query: &Query) -> Result<()> {
        let conn = self.connection()?;
        execute_with(&mut **conn, query).await?;
        self.conn = None;
        Ok(())
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("database", &self.database)
            .field("finished", &self.is_finished())
            .finish()
    }
}

impl Executor for Transaction {
    async fn execute(&mut self, query: &Query) -> Result<u64> {
        let conn = self.connection()?;
        Ok(execute_with(&mut **conn, query).await?.rows_affected())
    }

    async fn execute_insert(&mut self, query: &Query) -> Result<i64> {
        let conn = self.connection()?;
        Ok(execute_with(&mut **conn, query).await?.last_insert_rowid())
    }

    async fn fetch_all(&mut self, query: &Query) -> Result<Vec<Row>> {
        let conn = self.connection()?;
        fetch_all_with(&mut **conn, query).await
    }

    async fn fetch_optional(&mut self, query: &Query) -> Result<Option<Row>> {
        let conn = self.connection()?;
        fetch_optional_with(&mut **conn, query).await
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };
        warn!(database = %self.database, "Transaction dropped unfinished, rolling back");

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(rollback_or_discard(conn));
            }
            // Closing the connection makes SQLite discard the transaction
            Err(_) => drop(conn.detach()),
        }
    }
}

/// Roll back on `conn`, or close it when that fails so a connection still
/// inside a transaction never returns to the pool
async fn rollback_or_discard(mut conn: PoolConnection<Sqlite>) -> Result<()> {
    let rollback = RollbackTransaction::new().build();
    if let Err(error) = execute_with(&mut *conn, &rollback).await {
        warn!(%error, "Rollback of dropped transaction failed, closing connection");
        drop(conn.detach());
        return Err(error);
    }
    Ok(())
}

/// Run `f` inside a transaction, committing when it returns `Ok` and rolling
/// back when it returns `Err`.
///
/// ```no_run
/// # async fn demo(db: squeeb::Database) -> squeeb::Result<()> {
/// use squeeb::{transaction, Executor};
/// use squeeb_core::{insert, QueryBuilder};
///
/// let id = transaction(&db, |tx| {
///     Box::pin(async move {
///         tx.execute_insert(&insert("artists").values([("name", "Can")]).build())
///             .await
///     })
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn transaction<T, F>(db: &Database, f: F) -> Result<T>
where
    F: for<'t> FnOnce(&'t mut Transaction) -> BoxFuture<'t, Result<T>>,
{
    let mut tx = db.begin(None).await?;

    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_error) = tx.rollback().await {
                warn!(error = %rollback_error, "Rollback failed");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatabaseConfig;
    use squeeb_core::{insert, select, Value};

    async fn db_with_table() -> Database {
        let mut db = Database::connect(&DatabaseConfig::in_memory("test"))
            .await
            .unwrap();
        db.execute(&Query::new(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT)",
            Vec::new(),
        ))
        .await
        .unwrap();
        db
    }

    async fn count(db: &mut Database) -> usize {
        db.fetch_all(&select("notes").build()).await.unwrap().len()
    }

    fn add_note(body: &str) -> Query {
        insert("notes").values([("body", body)]).build()
    }

    #[tokio::test]
    async fn test_commit() {
        let mut db = db_with_table().await;
        let mut tx = db.begin(None).await.unwrap();
        tx.execute(&add_note("one")).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(count(&mut db).await, 1);
    }

    #[tokio::test]
    async fn test_rollback() {
        let mut db = db_with_table().await;
        let mut tx = db
            .begin(Some(TransactionBehavior::Immediate))
            .await
            .unwrap();
        tx.execute(&add_note("one")).await.unwrap();
        tx.rollback().await.unwrap();
        assert_eq!(count(&mut db).await, 0);
    }

    #[tokio::test]
    async fn test_savepoints() {
        let mut db = db_with_table().await;
        let mut tx = db.begin(None).await.unwrap();
        tx.execute(&add_note("kept")).await.unwrap();
        tx.savepoint("sp1").await.unwrap();
        tx.execute(&add_note("discarded")).await.unwrap();
        tx.rollback_to_savepoint("sp1").await.unwrap();
        tx.release_savepoint("sp1").await.unwrap();
        tx.commit().await.unwrap();

        let rows = db.fetch_all(&select("notes").build()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("body"), Some(&Value::from("kept")));
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let mut db = db_with_table().await;
        {
            let mut tx = db.begin(None).await.unwrap();
            tx.execute(&add_note("lost")).await.unwrap();
        }
        assert_eq!(count(&mut db).await, 0);
    }

    #[tokio::test]
    async fn test_failed_rollback_discards_connection() {
        let path = std::env::temp_dir().join(format!("squeeb-discard-{}.db", std::process::id()));
        let config = DatabaseConfig::new("discard").with_filename(path.to_string_lossy());
        let db = Database::connect(&config).await.unwrap();

        let conn = db.pool().acquire().await.unwrap();
        let connections = db.pool().size();
        // No transaction is open, so ROLLBACK fails
        assert!(rollback_or_discard(conn).await.is_err());
        assert_eq!(db.pool().size(), connections - 1);

        db.close().await;
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_transaction_helper() {
        let mut db = db_with_table().await;

        let id = transaction(&db, |tx| {
            Box::pin(async move { tx.execute_insert(&add_note("one")).await })
        })
        .await
        .unwrap();
        assert_eq!(id, 1);

        let result: Result<()> = transaction(&db, |tx| {
            Box::pin(async move {
                tx.execute(&add_note("two")).await?;
                Err(Error::config("abort"))
            })
        })
        .await;
        assert!(matches!(result, Err(Error::Config { .. })));
        assert_eq!(count(&mut db).await, 1);
    }
}
