//! SELECT query builder module

use super::{check_where, where_sql, where_values, ArgKind, QueryBuilder};
use crate::condition::Predicate;
use crate::error::BuildError;
use crate::operator::SortDirection;
use crate::value_map::Values;
use crate::Value;

/// `SELECT cols FROM T [WHERE W] [ORDER BY ..] [LIMIT n [OFFSET m]]`
#[derive(Debug, Clone)]
pub struct SelectQueryBuilder {
    table_name: String,
    columns: Vec<String>,
    values: Option<Values>,
    where_clause: Option<Predicate>,
    order_by: Vec<(String, SortDirection)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectQueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table_name: table.into(),
            columns: Vec::new(),
            values: None,
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Select explicit columns instead of `*`
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Select the columns named by a value map. The values themselves are not bound.
    pub fn values(mut self, values: impl Into<Values>) -> Self {
        self.values = Some(values.into());
        self
    }

    pub fn where_(mut self, predicate: impl Into<Predicate>) -> Self {
        self.where_clause = Some(predicate.into());
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    fn column_list(&self) -> String {
        if !self.columns.is_empty() {
            return self.columns.join(", ");
        }
        match &self.values {
            Some(values) if !values.is_empty() => values.column_list(),
            _ => "*".to_string(),
        }
    }
}

impl QueryBuilder for SelectQueryBuilder {
    fn table_name(&self) -> Option<&str> {
        Some(&self.table_name)
    }

    fn needed_args(&self) -> &[ArgKind] {
        &[ArgKind::Where]
    }

    fn validate(&self) -> Result<(), BuildError> {
        check_where(self.where_clause.as_ref())
    }

    fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.column_list(), self.table_name);
        sql.push_str(&where_sql(self.where_clause.as_ref()));

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        // SQLite only accepts OFFSET after a LIMIT; -1 means no limit
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }

        sql
    }

    fn where_args(&self) -> Vec<Value> {
        where_values(self.where_clause.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::assert_bindable;
    use crate::condition::{or_group, where_};
    use crate::ValueMap;

    #[test]
    fn test_select_all() {
        let query = SelectQueryBuilder::new("artists").build();
        assert_eq!(query.text(), "SELECT * FROM artists");
        assert!(query.args().is_empty());
        assert!(query.is_ok());
    }

    #[test]
    fn test_select_with_where() {
        let query = SelectQueryBuilder::new("albums")
            .where_(where_("year").greater_than_equals(1977).and().where_("artist_id").equals(3))
            .build();
        assert_eq!(
            query.text(),
            "SELECT * FROM albums WHERE year >= ? AND artist_id = ?"
        );
        assert_eq!(query.args(), &[Value::Integer(1977), Value::Integer(3)]);
        assert_bindable(&query);
    }

    #[test]
    fn test_select_value_map_columns_without_parentheses() {
        let query = SelectQueryBuilder::new("artists")
            .values(ValueMap::new().with("id", ()).with("name", ()))
            .build();
        assert_eq!(query.text(), "SELECT id, name FROM artists");
        assert!(query.args().is_empty());
    }

    #[test]
    fn test_select_explicit_columns_and_paging() {
        let query = SelectQueryBuilder::new("tracks")
            .columns(["title", "length"])
            .where_(or_group([where_("genre").equals("ambient"), where_("genre").equals("krautrock")]))
            .order_by("title", SortDirection::Asc)
            .order_by("length", SortDirection::Desc)
            .limit(10)
            .offset(20)
            .build();
        assert_eq!(
            query.text(),
            "SELECT title, length FROM tracks WHERE (genre = ? OR genre = ?) ORDER BY title ASC, length DESC LIMIT 10 OFFSET 20"
        );
        assert_bindable(&query);
    }

    #[test]
    fn test_offset_without_limit() {
        let query = SelectQueryBuilder::new("tracks").offset(5).build();
        assert_eq!(query.text(), "SELECT * FROM tracks LIMIT -1 OFFSET 5");
    }

    #[test]
    fn test_select_with_incomplete_where() {
        let query = SelectQueryBuilder::new("tracks")
            .where_(where_("genre").equals("ambient").and())
            .build();
        assert_eq!(query.error(), Some(&BuildError::IncompleteCondition));
    }

    #[test]
    fn test_select_in_list() {
        let query = SelectQueryBuilder::new("artists")
            .where_(where_("id").is_in([4, 8, 15]))
            .build();
        assert_eq!(query.text(), "SELECT * FROM artists WHERE id IN (?, ?, ?)");
        assert_eq!(
            query.args(),
            &[Value::Integer(4), Value::Integer(8), Value::Integer(15)]
        );
    }
}
