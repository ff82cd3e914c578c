//! Table schema descriptors

use super::column::{Column, ColumnCache};
use super::constraint::ForeignKey;
use super::index::TableIndex;
use crate::builder::{CreateIndexQueryBuilder, CreateTableQueryBuilder, DropTableQueryBuilder};
use crate::{Error, Result};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct SchemaColumn {
    field: String,
    column: Arc<Column>,
}

impl SchemaColumn {
    fn column_name(&self) -> &str {
        self.column.name().unwrap_or(self.field.as_str())
    }
}

/// Immutable description of one table: its columns keyed by field name,
/// its indexes and its table options.
#[derive(Debug, Clone)]
pub struct TableSchema {
    name: String,
    columns: Vec<SchemaColumn>,
    indexes: Vec<TableIndex>,
    primary_key: usize,
    temporary: bool,
    if_not_exists: bool,
    strict: bool,
    without_rowid: bool,
}

impl TableSchema {
    pub fn builder(name: impl Into<String>) -> TableSchemaBuilder {
        TableSchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `(field, column)` pairs in declaration order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Arc<Column>)> {
        self.columns
            .iter()
            .map(|entry| (entry.field.as_str(), &entry.column))
    }

    pub fn column(&self, field: &str) -> Option<&Arc<Column>> {
        self.columns
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| &entry.column)
    }

    /// SQL column name of a field
    pub fn column_name(&self, field: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|entry| entry.field == field)
            .map(SchemaColumn::column_name)
    }

    /// Field name of an SQL column
    pub fn field_name(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|entry| entry.column_name() == column)
            .map(|entry| entry.field.as_str())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(SchemaColumn::column_name).collect()
    }

    /// `(field, column)` of the primary key
    pub fn primary_key(&self) -> (&str, &Arc<Column>) {
        let entry = &self.columns[self.primary_key];
        (entry.field.as_str(), &entry.column)
    }

    pub fn primary_key_field(&self) -> &str {
        &self.columns[self.primary_key].field
    }

    pub fn primary_key_column(&self) -> &str {
        self.columns[self.primary_key].column_name()
    }

    /// Whether the primary key is an INTEGER PRIMARY KEY, i.e. an alias of the rowid
    pub fn has_rowid_key(&self) -> bool {
        !self.without_rowid
            && self.columns[self.primary_key].column.data_type() == super::DataType::Integer
    }

    /// `(column name, key)` for every foreign key
    pub fn foreign_keys(&self) -> Vec<(&str, &ForeignKey)> {
        self.columns
            .iter()
            .filter_map(|entry| {
                entry
                    .column
                    .foreign_key()
                    .map(|key| (entry.column_name(), key))
            })
            .collect()
    }

    /// Distinct tables this table references, in declaration order
    pub fn referenced_tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = Vec::new();
        for (_, key) in self.foreign_keys() {
            if !tables.contains(&key.table()) {
                tables.push(key.table());
            }
        }
        tables
    }

    pub fn indexes(&self) -> &[TableIndex] {
        &self.indexes
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_without_rowid(&self) -> bool {
        self.without_rowid
    }

    pub fn create_table_query(&self) -> CreateTableQueryBuilder {
        CreateTableQueryBuilder::new(&self.name)
            .columns(self.columns.iter().map(|entry| Arc::clone(&entry.column)))
            .temporary(self.temporary)
            .if_not_exists(self.if_not_exists)
            .strict(self.strict)
            .without_rowid(self.without_rowid)
    }

    pub fn create_index_queries(&self) -> Vec<CreateIndexQueryBuilder> {
        self.indexes
            .iter()
            .map(|index| index.create_query(&self.name))
            .collect()
    }

    pub fn drop_table_query(&self) -> DropTableQueryBuilder {
        DropTableQueryBuilder::new(&self.name).if_exists(true)
    }
}

/// Declares a [`TableSchema`]
#[derive(Debug, Clone)]
pub struct TableSchemaBuilder {
    name: String,
    columns: Vec<(String, Column)>,
    indexes: Vec<TableIndex>,
    temporary: bool,
    if_not_exists: bool,
    strict: bool,
    without_rowid: bool,
}

impl TableSchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            temporary: false,
            if_not_exists: false,
            strict: false,
            without_rowid: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a column for `field`. An unnamed column is named after the field.
    pub fn column(mut self, field: impl Into<String>, column: Column) -> Self {
        self.columns.push((field.into(), column));
        self
    }

    /// Add an index; its columns may be given by field or column name
    pub fn index(mut self, index: TableIndex) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn without_rowid(mut self) -> Self {
        self.without_rowid = true;
        self
    }

    /// Validate the declaration with a private column cache
    pub fn build(self) -> Result<TableSchema> {
        self.build_with(&mut ColumnCache::new())
    }

    /// Validate the declaration, sharing column descriptors through `cache`
    pub fn build_with(self, cache: &mut ColumnCache) -> Result<TableSchema> {
        let table = self.name;
        if table.trim().is_empty() {
            return Err(Error::invalid_schema(table, "table name must not be empty"));
        }
        if self.columns.is_empty() {
            return Err(Error::invalid_schema(table, "at least one column is required"));
        }

        let mut fields = HashSet::new();
        let mut names = HashSet::new();
        let mut columns = Vec::with_capacity(self.columns.len());
        for (field, column) in self.columns {
            let column = if column.name().is_some() {
                column
            } else {
                column.named(field.as_str())
            };
            let column_name = column.name().unwrap_or(field.as_str()).to_string();
            if !fields.insert(field.clone()) {
                return Err(Error::invalid_schema(
                    table,
                    format!("field '{}' is declared twice", field),
                ));
            }
            if !names.insert(column_name.clone()) {
                return Err(Error::invalid_schema(
                    table,
                    format!("column '{}' is declared twice", column_name),
                ));
            }
            columns.push(SchemaColumn {
                field,
                column: cache.intern(column),
            });
        }

        let keys: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.column.is_primary_key())
            .map(|(position, _)| position)
            .collect();
        let primary_key = match keys.as_slice() {
            [key] => *key,
            [] => return Err(Error::invalid_schema(table, "no primary key column declared")),
            _ => {
                return Err(Error::invalid_schema(
                    table,
                    "more than one primary key column declared",
                ))
            }
        };

        let mut indexes = Vec::with_capacity(self.indexes.len());
        for index in self.indexes {
            let mut resolved = Vec::with_capacity(index.columns().len());
            for indexed in index.columns() {
                let name = columns
                    .iter()
                    .find(|entry| entry.field == indexed.column())
                    .or_else(|| columns.iter().find(|entry| entry.column_name() == indexed.column()))
                    .map(SchemaColumn::column_name)
                    .ok_or_else(|| Error::column_not_found(&table, indexed.column()))?;
                resolved.push(indexed.with_column(name));
            }
            indexes.push(index.with_columns(resolved));
        }

        Ok(TableSchema {
            name: table,
            columns,
            indexes,
            primary_key,
            temporary: self.temporary,
            if_not_exists: self.if_not_exists,
            strict: self.strict,
            without_rowid: self.without_rowid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::QueryBuilder;
    use crate::schema::{Constraint, KeyAction, PrimaryKey};

    fn artists() -> TableSchema {
        TableSchema::builder("artists")
            .column(
                "id",
                Column::integer().constraint(PrimaryKey::new().autoincrement().unique()),
            )
            .column("name", Column::text().constraint(Constraint::not_null()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_table_in_declaration_order() {
        let query = artists().create_table_query().build();
        assert_eq!(
            query.text(),
            "CREATE TABLE artists (id INTEGER PRIMARY KEY AUTOINCREMENT UNIQUE, name TEXT NOT NULL)"
        );
    }

    #[test]
    fn test_field_column_mapping() {
        let schema = TableSchema::builder("albums")
            .column("id", Column::integer().named("album_id").constraint(PrimaryKey::new()))
            .column("title", Column::text())
            .build()
            .unwrap();
        assert_eq!(schema.column_name("id"), Some("album_id"));
        assert_eq!(schema.field_name("album_id"), Some("id"));
        assert_eq!(schema.column_name("title"), Some("title"));
        assert_eq!(schema.column_names(), vec!["album_id", "title"]);
        assert_eq!(schema.primary_key_field(), "id");
        assert_eq!(schema.primary_key_column(), "album_id");
        assert!(schema.has_rowid_key());
    }

    #[test]
    fn test_foreign_keys() {
        let artists = artists();
        let albums = TableSchema::builder("albums")
            .column("id", Column::integer().constraint(PrimaryKey::new()))
            .column(
                "artist",
                Column::integer()
                    .named("artist_id")
                    .constraint(ForeignKey::references(&artists, "id").unwrap().on_delete(KeyAction::Cascade)),
            )
            .build()
            .unwrap();

        let keys = albums.foreign_keys();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].0, "artist_id");
        assert_eq!(albums.referenced_tables(), vec!["artists"]);
        assert_eq!(
            albums.create_table_query().to_sql(),
            "CREATE TABLE albums (id INTEGER PRIMARY KEY, artist_id INTEGER REFERENCES \"artists\"(\"id\") ON DELETE CASCADE)"
        );
    }

    #[test]
    fn test_requires_columns() {
        let err = TableSchema::builder("empty").build().unwrap_err();
        assert!(matches!(err, Error::InvalidSchema { .. }));
    }

    #[test]
    fn test_requires_single_primary_key() {
        let err = TableSchema::builder("tags")
            .column("name", Column::text())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("no primary key"));

        let err = TableSchema::builder("tags")
            .column("a", Column::integer().constraint(PrimaryKey::new()))
            .column("b", Column::integer().constraint(PrimaryKey::new()))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("more than one primary key"));
    }

    #[test]
    fn test_rejects_duplicate_column_names() {
        let err = TableSchema::builder("tags")
            .column("id", Column::integer().constraint(PrimaryKey::new()))
            .column("label", Column::text().named("name"))
            .column("name", Column::text())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("column 'name' is declared twice"));
    }

    #[test]
    fn test_indexes_resolve_field_names() {
        let schema = TableSchema::builder("tracks")
            .column("id", Column::integer().constraint(PrimaryKey::new()))
            .column("album", Column::integer().named("album_id"))
            .column("number", Column::integer())
            .index(TableIndex::new(["album", "number"]).unique())
            .build()
            .unwrap();
        let queries: Vec<String> = schema
            .create_index_queries()
            .iter()
            .map(|query| query.build().text().to_string())
            .collect();
        assert_eq!(
            queries,
            vec!["CREATE UNIQUE INDEX \"tracks_album_id-number\" ON \"tracks\" (album_id, number)"]
        );
    }

    #[test]
    fn test_index_on_missing_column() {
        let err = TableSchema::builder("tracks")
            .column("id", Column::integer().constraint(PrimaryKey::new()))
            .index(TableIndex::new(["genre"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound { .. }));
    }

    #[test]
    fn test_table_options_and_drop() {
        let schema = TableSchema::builder("session")
            .column("key", Column::text().constraint(PrimaryKey::new()))
            .temporary()
            .if_not_exists()
            .strict()
            .without_rowid()
            .build()
            .unwrap();
        assert_eq!(
            schema.create_table_query().to_sql(),
            "CREATE TEMPORARY TABLE IF NOT EXISTS session (key TEXT PRIMARY KEY) STRICT, WITHOUT ROWID"
        );
        assert_eq!(schema.drop_table_query().to_sql(), "DROP TABLE IF EXISTS session");
        assert!(!schema.has_rowid_key());
    }
}
