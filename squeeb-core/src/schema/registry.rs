//! Table registration grouped by database

use super::column::ColumnCache;
use super::table::{TableSchema, TableSchemaBuilder};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Owns every declared table, grouped by the database it belongs to, and the
/// column cache their descriptors are interned in.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    cache: ColumnCache,
    databases: IndexMap<String, IndexMap<String, Arc<TableSchema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `table` and register it under `database`.
    ///
    /// Registering a name twice replaces the earlier schema, keeping its position.
    pub fn define_table(
        &mut self,
        database: impl Into<String>,
        table: TableSchemaBuilder,
    ) -> Result<Arc<TableSchema>> {
        let database = database.into();
        let schema = Arc::new(table.build_with(&mut self.cache)?);
        let tables = self.databases.entry(database.clone()).or_default();
        if tables
            .insert(schema.name().to_string(), Arc::clone(&schema))
            .is_some()
        {
            warn!(database = %database, table = schema.name(), "table redefined, replacing earlier schema");
        } else {
            debug!(database = %database, table = schema.name(), "table defined");
        }
        Ok(schema)
    }

    pub fn databases(&self) -> impl Iterator<Item = &str> {
        self.databases.keys().map(String::as_str)
    }

    /// Tables of `database` in registration order
    pub fn tables(&self, database: &str) -> Vec<Arc<TableSchema>> {
        self.databases
            .get(database)
            .map(|tables| tables.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn table(&self, database: &str, name: &str) -> Result<Arc<TableSchema>> {
        self.databases
            .get(database)
            .and_then(|tables| tables.get(name))
            .cloned()
            .ok_or_else(|| Error::table_not_found(database, name))
    }

    pub fn column_cache(&self) -> &ColumnCache {
        &self.cache
    }

    /// Every foreign key of `database` must reference a table of the same database
    pub fn validate_foreign_keys(&self, database: &str) -> Result<()> {
        let Some(tables) = self.databases.get(database) else {
            return Ok(());
        };
        for schema in tables.values() {
            for (column, key) in schema.foreign_keys() {
                if !tables.contains_key(key.table()) {
                    return Err(Error::ForeignKeyOutsideDatabase {
                        database: database.to_string(),
                        table: schema.name().to_string(),
                        column: column.to_string(),
                        foreign_table: key.table().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Tables of `database` ordered so referenced tables come before the
    /// tables that reference them.
    ///
    /// Ties keep registration order. Self references and references outside
    /// the database are ignored here; see [`SchemaRegistry::validate_foreign_keys`].
    pub fn creation_order(&self, database: &str) -> Result<Vec<Arc<TableSchema>>> {
        let Some(tables) = self.databases.get(database) else {
            return Ok(Vec::new());
        };

        let mut pending: Vec<&Arc<TableSchema>> = tables.values().collect();
        let mut ordered: Vec<Arc<TableSchema>> = Vec::with_capacity(pending.len());
        while !pending.is_empty() {
            let ready = pending.iter().position(|schema| {
                schema.referenced_tables().into_iter().all(|referenced| {
                    referenced == schema.name()
                        || !tables.contains_key(referenced)
                        || ordered.iter().any(|placed| placed.name() == referenced)
                })
            });
            match ready {
                Some(position) => ordered.push(Arc::clone(pending.remove(position))),
                None => {
                    return Err(Error::ForeignKeyCycle {
                        tables: pending.iter().map(|schema| schema.name().to_string()).collect(),
                    })
                }
            }
        }
        Ok(ordered)
    }
}
