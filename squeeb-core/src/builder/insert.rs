//! INSERT query builder module

use super::{ArgKind, QueryBuilder};
use crate::error::BuildError;
use crate::value_map::Values;
use crate::Value;

/// `INSERT INTO T (cols) VALUES (?, ...)[, (?, ...)]`
#[derive(Debug, Clone)]
pub struct InsertQueryBuilder {
    table_name: String,
    values: Option<Values>,
}

impl InsertQueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table_name: table.into(),
            values: None,
        }
    }

    /// Set the row payload. A `Vec<ValueMap>` or [`ValueMapGroup`](crate::ValueMapGroup)
    /// inserts several rows in one statement.
    pub fn values(mut self, values: impl Into<Values>) -> Self {
        self.values = Some(values.into());
        self
    }
}

impl QueryBuilder for InsertQueryBuilder {
    fn table_name(&self) -> Option<&str> {
        Some(&self.table_name)
    }

    fn needed_args(&self) -> &[ArgKind] {
        &[ArgKind::Value]
    }

    fn validate(&self) -> Result<(), BuildError> {
        match &self.values {
            None => Err(BuildError::EmptyValues { statement: "INSERT" }),
            Some(values) if values.is_empty() => Err(BuildError::EmptyValues { statement: "INSERT" }),
            Some(Values::Group(group)) => group.check_columns(),
            Some(Values::Single(_)) => Ok(()),
        }
    }

    fn to_sql(&self) -> String {
        let Some(values) = &self.values else {
            return String::new();
        };
        format!(
            "INSERT INTO {} {} VALUES {}",
            self.table_name,
            values.column_string(),
            values.values_string()
        )
    }

    fn value_args(&self) -> Vec<Value> {
        self.values.as_ref().map(Values::values).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::assert_bindable;
    use crate::ValueMap;

    #[test]
    fn test_single_row_insert() {
        let query = InsertQueryBuilder::new("artists")
            .values([("name", Value::from("Kraftwerk")), ("formed", Value::from(1970))])
            .build();
        assert_eq!(query.text(), "INSERT INTO artists (name, formed) VALUES (?, ?)");
        assert_eq!(query.args(), &[Value::from("Kraftwerk"), Value::Integer(1970)]);
        assert_bindable(&query);
    }

    #[test]
    fn test_multi_row_insert() {
        let rows = vec![
            ValueMap::new().with("title", "Autobahn").with("year", 1974),
            ValueMap::new().with("title", "Radio-Activity").with("year", 1975),
        ];
        let query = InsertQueryBuilder::new("albums").values(rows).build();
        assert_eq!(
            query.text(),
            "INSERT INTO albums (title, year) VALUES (?, ?), (?, ?)"
        );
        assert_eq!(
            query.args(),
            &[
                Value::from("Autobahn"),
                Value::Integer(1974),
                Value::from("Radio-Activity"),
                Value::Integer(1975),
            ]
        );
        assert_bindable(&query);
    }

    #[test]
    fn test_insert_without_values() {
        let query = InsertQueryBuilder::new("artists").build();
        assert_eq!(
            query.error(),
            Some(&BuildError::EmptyValues { statement: "INSERT" })
        );

        let query = InsertQueryBuilder::new("artists").values(ValueMap::new()).build();
        assert!(!query.is_ok());
    }

    #[test]
    fn test_insert_mismatched_rows() {
        let rows = vec![
            ValueMap::new().with("title", "Autobahn").with("year", 1974),
            ValueMap::new().with("title", "Ralf und Florian"),
        ];
        let query = InsertQueryBuilder::new("albums").values(rows).build();
        assert_eq!(query.error(), Some(&BuildError::MismatchedColumns { row: 1 }));
    }
}
