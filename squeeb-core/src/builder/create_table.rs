//! CREATE TABLE query builder module

use super::QueryBuilder;
use crate::error::BuildError;
use crate::schema::Column;
use std::sync::Arc;

/// `CREATE [TEMPORARY] TABLE [IF NOT EXISTS] T (col TYPE [constraints], ...) [STRICT, WITHOUT ROWID]`
#[derive(Debug, Clone)]
pub struct CreateTableQueryBuilder {
    table_name: String,
    columns: Vec<Arc<Column>>,
    temporary: bool,
    if_not_exists: bool,
    strict: bool,
    without_rowid: bool,
}

impl CreateTableQueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table_name: table.into(),
            columns: Vec::new(),
            temporary: false,
            if_not_exists: false,
            strict: false,
            without_rowid: false,
        }
    }

    /// Append a column definition; columns render in the order they are added
    pub fn column(mut self, column: impl Into<Arc<Column>>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Arc<Column>>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }

    pub fn if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = if_not_exists;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn without_rowid(mut self, without_rowid: bool) -> Self {
        self.without_rowid = without_rowid;
        self
    }
}

impl QueryBuilder for CreateTableQueryBuilder {
    fn table_name(&self) -> Option<&str> {
        Some(&self.table_name)
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.columns.is_empty() {
            return Err(BuildError::NoColumns);
        }
        match self.columns.iter().position(|column| column.name().is_none()) {
            Some(index) => Err(BuildError::UnnamedColumn { index }),
            None => Ok(()),
        }
    }

    fn to_sql(&self) -> String {
        let mut sql = String::from("CREATE ");
        if self.temporary {
            sql.push_str("TEMPORARY ");
        }
        sql.push_str("TABLE ");
        if self.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&self.table_name);

        let definitions: Vec<String> = self.columns.iter().map(|column| column.to_string()).collect();
        sql.push_str(" (");
        sql.push_str(&definitions.join(", "));
        sql.push(')');

        let mut options = Vec::new();
        if self.strict {
            options.push("STRICT");
        }
        if self.without_rowid {
            options.push("WITHOUT ROWID");
        }
        if !options.is_empty() {
            sql.push(' ');
            sql.push_str(&options.join(", "));
        }

        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Constraint, DataType, PrimaryKey};

    fn id_column() -> Column {
        Column::integer()
            .named("id")
            .constraint(PrimaryKey::new().autoincrement().unique())
    }

    #[test]
    fn test_create_table() {
        let query = CreateTableQueryBuilder::new("artists")
            .column(id_column())
            .column(Column::text().named("name"))
            .build();
        assert_eq!(
            query.text(),
            "CREATE TABLE artists (id INTEGER PRIMARY KEY AUTOINCREMENT UNIQUE, name TEXT)"
        );
        assert!(query.args().is_empty());
    }

    #[test]
    fn test_create_table_options() {
        let query = CreateTableQueryBuilder::new("scratch")
            .column(Column::new(DataType::Integer).named("id").constraint(PrimaryKey::new()))
            .column(Column::blob().named("payload").constraint(Constraint::not_null()))
            .temporary(true)
            .if_not_exists(true)
            .strict(true)
            .without_rowid(true)
            .build();
        assert_eq!(
            query.text(),
            "CREATE TEMPORARY TABLE IF NOT EXISTS scratch (id INTEGER PRIMARY KEY, payload BLOB NOT NULL) STRICT, WITHOUT ROWID"
        );
    }

    #[test]
    fn test_create_table_requires_columns() {
        let query = CreateTableQueryBuilder::new("empty").build();
        assert_eq!(query.error(), Some(&BuildError::NoColumns));
    }

    #[test]
    fn test_create_table_requires_column_names() {
        let query = CreateTableQueryBuilder::new("artists")
            .column(id_column())
            .column(Column::text())
            .build();
        assert_eq!(query.error(), Some(&BuildError::UnnamedColumn { index: 1 }));
    }
}
