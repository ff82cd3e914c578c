//! Secondary index descriptors

use super::constraint::CollateSequence;
use crate::builder::CreateIndexQueryBuilder;
use crate::operator::SortDirection;
use std::fmt::{self, Display};

/// One column of an index: `name [COLLATE x] [ASC|DESC]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexedColumn {
    column: String,
    collation: Option<CollateSequence>,
    order: Option<SortDirection>,
}

impl IndexedColumn {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            collation: None,
            order: None,
        }
    }

    pub fn collate(mut self, collation: CollateSequence) -> Self {
        self.collation = Some(collation);
        self
    }

    pub fn order(mut self, order: SortDirection) -> Self {
        self.order = Some(order);
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub(crate) fn with_column(&self, column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ..self.clone()
        }
    }
}

impl Display for IndexedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column)?;
        if let Some(collation) = self.collation {
            write!(f, " COLLATE {}", collation)?;
        }
        if let Some(order) = self.order {
            write!(f, " {}", order)?;
        }
        Ok(())
    }
}

impl From<&str> for IndexedColumn {
    fn from(column: &str) -> Self {
        Self::new(column)
    }
}

impl From<String> for IndexedColumn {
    fn from(column: String) -> Self {
        Self::new(column)
    }
}

/// `{table}_{col1-col2}`
pub fn default_index_name(table: &str, columns: &[IndexedColumn]) -> String {
    let names: Vec<&str> = columns.iter().map(IndexedColumn::column).collect();
    format!("{}_{}", table, names.join("-"))
}

/// A secondary index over one or more columns of a table.
///
/// Columns are de-duplicated by name, keeping the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIndex {
    name: Option<String>,
    columns: Vec<IndexedColumn>,
    unique: bool,
    if_not_exists: bool,
}

impl TableIndex {
    pub fn new<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<IndexedColumn>,
    {
        let mut unique_columns: Vec<IndexedColumn> = Vec::new();
        for column in columns.into_iter().map(Into::into) {
            if !unique_columns.iter().any(|seen| seen.column == column.column) {
                unique_columns.push(column);
            }
        }
        Self {
            name: None,
            columns: unique_columns,
            unique: false,
            if_not_exists: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn columns(&self) -> &[IndexedColumn] {
        &self.columns
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// The explicit name, or the name derived from `table` and the columns
    pub fn name_for(&self, table: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => default_index_name(table, &self.columns),
        }
    }

    pub fn create_query(&self, table: &str) -> CreateIndexQueryBuilder {
        CreateIndexQueryBuilder::new(table)
            .name(self.name_for(table))
            .columns(self.columns.iter().cloned())
            .unique(self.unique)
            .if_not_exists(self.if_not_exists)
    }

    pub(crate) fn with_columns(&self, columns: Vec<IndexedColumn>) -> Self {
        Self {
            columns,
            ..self.clone()
        }
    }
}
