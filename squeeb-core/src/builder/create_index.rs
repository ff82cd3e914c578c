//! CREATE INDEX query builder module

use super::QueryBuilder;
use crate::error::BuildError;
use crate::schema::{default_index_name, IndexedColumn};

/// `CREATE [UNIQUE] INDEX [IF NOT EXISTS] "name" ON "T" (col, ...)`
#[derive(Debug, Clone)]
pub struct CreateIndexQueryBuilder {
    table_name: String,
    index_name: Option<String>,
    columns: Vec<IndexedColumn>,
    unique: bool,
    if_not_exists: bool,
}

impl CreateIndexQueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table_name: table.into(),
            index_name: None,
            columns: Vec::new(),
            unique: false,
            if_not_exists: false,
        }
    }

    /// Name the index; defaults to `{table}_{col1-col2}`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn column(mut self, column: impl Into<IndexedColumn>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<IndexedColumn>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = if_not_exists;
        self
    }

    pub fn index_name(&self) -> String {
        match &self.index_name {
            Some(name) => name.clone(),
            None => default_index_name(&self.table_name, &self.columns),
        }
    }
}

impl QueryBuilder for CreateIndexQueryBuilder {
    fn table_name(&self) -> Option<&str> {
        Some(&self.table_name)
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.columns.is_empty() {
            return Err(BuildError::NoIndexedColumns);
        }
        Ok(())
    }

    fn to_sql(&self) -> String {
        let mut sql = String::from("CREATE ");
        if self.unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str("INDEX ");
        if self.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        let columns: Vec<String> = self.columns.iter().map(|column| column.to_string()).collect();
        sql.push_str(&format!(
            "\"{}\" ON \"{}\" ({})",
            self.index_name(),
            self.table_name,
            columns.join(", ")
        ));
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::SortDirection;
    use crate::schema::CollateSequence;

    #[test]
    fn test_create_index_default_name() {
        let query = CreateIndexQueryBuilder::new("tracks")
            .columns(["album_id", "number"])
            .build();
        assert_eq!(
            query.text(),
            "CREATE INDEX \"tracks_album_id-number\" ON \"tracks\" (album_id, number)"
        );
    }

    #[test]
    fn test_create_unique_index() {
        let query = CreateIndexQueryBuilder::new("artists")
            .name("artist_name")
            .column(
                IndexedColumn::new("name")
                    .collate(CollateSequence::NoCase)
                    .order(SortDirection::Desc),
            )
            .unique(true)
            .if_not_exists(true)
            .build();
        assert_eq!(
            query.text(),
            "CREATE UNIQUE INDEX IF NOT EXISTS \"artist_name\" ON \"artists\" (name COLLATE NOCASE DESC)"
        );
    }

    #[test]
    fn test_create_index_requires_columns() {
        let query = CreateIndexQueryBuilder::new("artists").build();
        assert_eq!(query.error(), Some(&BuildError::NoIndexedColumns));
    }
}
