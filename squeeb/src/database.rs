//! The database handle

use crate::executor::{execute_with, fetch_all_with, fetch_optional_with};
use crate::{DatabaseConfig, Executor, Result, Row, Transaction};
use sqlx::SqlitePool;
use squeeb_core::{
    where_, PragmaQueryBuilder, Query, QueryBuilder, SchemaRegistry, SelectQueryBuilder,
    TransactionBehavior,
};
use tracing::{info, warn};

/// A named SQLite database backed by a connection pool.
///
/// Cloning is cheap; clones share the pool. The name selects which tables of a
/// [`SchemaRegistry`] belong to this database.
#[derive(Debug, Clone)]
pub struct Database {
    name: String,
    pool: SqlitePool,
}

impl Database {
    /// Open the pool described by `config`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        config.validate()?;
        info!(
            database = %config.name,
            url = %config.connect_url(),
            foreign_keys = config.foreign_keys,
            "Opening SQLite database"
        );

        let pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| {
                warn!(error = %e, database = %config.name, "Failed to open database");
                e
            })?;

        info!(connections = pool.size(), "SQLite connection pool ready");
        Ok(Self::from_pool(config.name.clone(), pool))
    }

    /// Wrap an already configured pool
    pub fn from_pool(name: impl Into<String>, pool: SqlitePool) -> Self {
        Self {
            name: name.into(),
            pool,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a PRAGMA and return whatever rows it reports
    pub async fn pragma(&self, pragma: &PragmaQueryBuilder) -> Result<Vec<Row>> {
        fetch_all_with(&self.pool, &pragma.build()).await
    }

    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let query = SelectQueryBuilder::new("sqlite_master")
            .columns(["name"])
            .where_(
                where_("type")
                    .equals("table")
                    .and()
                    .where_("name")
                    .equals(table),
            )
            .build();
        Ok(fetch_optional_with(&self.pool, &query).await?.is_some())
    }

    /// Create every table registered under this database's name, then their
    /// indexes. Existing tables are left alone.
    pub async fn init_tables(&self, registry: &SchemaRegistry) -> Result<()> {
        registry.validate_foreign_keys(&self.name)?;
        let tables = registry.creation_order(&self.name)?;
        if tables.is_empty() {
            warn!(database = %self.name, "No tables registered for database");
        }

        for table in &tables {
            let create = table.create_table_query().if_not_exists(true).build();
            execute_with(&self.pool, &create).await?;
            for index in table.create_index_queries() {
                execute_with(&self.pool, &index.if_not_exists(true).build()).await?;
            }
            info!(database = %self.name, table = table.name(), "Table ready");
        }
        Ok(())
    }

    /// Drop every table registered under this database's name, referencing
    /// tables first
    pub async fn drop_tables(&self, registry: &SchemaRegistry) -> Result<()> {
        let tables = registry.creation_order(&self.name)?;
        for table in tables.iter().rev() {
            execute_with(&self.pool, &table.drop_table_query().build()).await?;
            info!(database = %self.name, table = table.name(), "Table dropped");
        }
        Ok(())
    }

    /// Start an explicit transaction on one pooled connection
    pub async fn begin(&self, behavior: Option<TransactionBehavior>) -> Result<Transaction> {
        Transaction::begin(&self.pool, &self.name, behavior).await
    }

    pub async fn close(&self) {
        info!(database = %self.name, "Closing SQLite database");
        self.pool.close().await;
    }
}

impl Executor for Database {
    async fn execute(&mut self, query: &Query) -> Result<u64> {
        Ok(execute_with(&self.pool, query).await?.rows_affected())
    }

    async fn execute_insert(&mut self, query: &Query) -> Result<i64> {
        Ok(execute_with(&self.pool, query).await?.last_insert_rowid())
    }

    async fn fetch_all(&mut self, query: &Query) -> Result<Vec<Row>> {
        fetch_all_with(&self.pool, query).await
    }

    async fn fetch_optional(&mut self, query: &Query) -> Result<Option<Row>> {
        fetch_optional_with(&self.pool, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use squeeb_core::{
        insert, select, BuildError, Column, Constraint, ForeignKey, PrimaryKey, TableIndex,
        TableSchema, Value,
    };
    use tokio_test::assert_ok;

    async fn memory_db() -> Database {
        Database::connect(&DatabaseConfig::in_memory("music"))
            .await
            .unwrap()
    }

    fn music_registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        let artists = registry
            .define_table(
                "music",
                TableSchema::builder("artists")
                    .column("id", Column::integer().constraint(PrimaryKey::new()))
                    .column("name", Column::text().constraint(Constraint::not_null())),
            )
            .unwrap();
        registry
            .define_table(
                "music",
                TableSchema::builder("albums")
                    .column("id", Column::integer().constraint(PrimaryKey::new()))
                    .column("title", Column::text())
                    .column(
                        "artist_id",
                        Column::integer()
                            .constraint(ForeignKey::references(&artists, "id").unwrap()),
                    )
                    .index(TableIndex::new(["artist_id"])),
            )
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_init_tables() {
        let db = memory_db().await;
        let registry = music_registry();

        assert_ok!(db.init_tables(&registry).await);
        assert!(db.table_exists("artists").await.unwrap());
        assert!(db.table_exists("albums").await.unwrap());
        assert!(!db.table_exists("tracks").await.unwrap());

        // Second run is a no-op
        assert_ok!(db.init_tables(&registry).await);
    }

    #[tokio::test]
    async fn test_drop_tables() {
        let db = memory_db().await;
        let registry = music_registry();
        db.init_tables(&registry).await.unwrap();

        db.drop_tables(&registry).await.unwrap();
        assert!(!db.table_exists("artists").await.unwrap());
        assert!(!db.table_exists("albums").await.unwrap());
    }

    #[tokio::test]
    async fn test_pragma() {
        let db = memory_db().await;
        let rows = db
            .pragma(&PragmaQueryBuilder::new("foreign_keys"))
            .await
            .unwrap();
        assert_eq!(rows[0].get("foreign_keys"), Some(&Value::Integer(1)));
    }

    #[tokio::test]
    async fn test_execute_and_fetch() {
        let mut db = memory_db().await;
        db.init_tables(&music_registry()).await.unwrap();

        let id = db
            .execute_insert(&insert("artists").values([("name", "Neu!")]).build())
            .await
            .unwrap();
        assert_eq!(id, 1);

        let rows = db
            .fetch_all(&select("artists").where_(where_("id").equals(id)).build())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&Value::from("Neu!")));
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let mut db = memory_db().await;
        db.init_tables(&music_registry()).await.unwrap();

        let result = db
            .execute(
                &insert("albums")
                    .values([("title", Value::from("Orphan")), ("artist_id", Value::Integer(42))])
                    .build(),
            )
            .await;
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn test_refuses_failed_query() {
        let mut db = memory_db().await;
        let result = db.execute(&squeeb_core::delete("artists").build()).await;
        assert!(matches!(
            result,
            Err(Error::Build(BuildError::MissingWhereClause))
        ));
    }
}
