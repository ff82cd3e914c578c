//! DELETE query builder module

use super::{check_where, where_sql, where_values, ArgKind, QueryBuilder};
use crate::condition::Predicate;
use crate::error::BuildError;
use crate::Value;

/// `DELETE FROM T WHERE W`
///
/// Without a WHERE clause the builder renders an empty string and refuses to
/// build, so a table-wide delete can never be produced by accident.
#[derive(Debug, Clone)]
pub struct DeleteQueryBuilder {
    table_name: String,
    where_clause: Option<Predicate>,
}

impl DeleteQueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table_name: table.into(),
            where_clause: None,
        }
    }

    pub fn where_(mut self, predicate: impl Into<Predicate>) -> Self {
        self.where_clause = Some(predicate.into());
        self
    }
}

impl QueryBuilder for DeleteQueryBuilder {
    fn table_name(&self) -> Option<&str> {
        Some(&self.table_name)
    }

    fn needed_args(&self) -> &[ArgKind] {
        &[ArgKind::Where]
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.where_clause.is_none() {
            return Err(BuildError::MissingWhereClause);
        }
        check_where(self.where_clause.as_ref())
    }

    fn to_sql(&self) -> String {
        if self.where_clause.is_none() {
            return String::new();
        }
        format!(
            "DELETE FROM {}{}",
            self.table_name,
            where_sql(self.where_clause.as_ref())
        )
    }

    fn where_args(&self) -> Vec<Value> {
        where_values(self.where_clause.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::assert_bindable;
    use crate::condition::where_;

    #[test]
    fn test_delete_with_where() {
        let query = DeleteQueryBuilder::new("artists")
            .where_(where_("id").equals(7))
            .build();
        assert_eq!(query.text(), "DELETE FROM artists WHERE id = ?");
        assert_eq!(query.args(), &[Value::Integer(7)]);
        assert_bindable(&query);
    }

    #[test]
    fn test_delete_without_where_renders_empty() {
        let builder = DeleteQueryBuilder::new("artists");
        assert_eq!(builder.to_sql(), "");

        let query = builder.build();
        assert_eq!(query.error(), Some(&BuildError::MissingWhereClause));
        assert_eq!(query.text(), "");
    }

    #[test]
    fn test_delete_with_noop_where() {
        let query = DeleteQueryBuilder::new("artists")
            .where_(where_("id").equals(None::<i64>))
            .build();
        assert_eq!(query.error(), Some(&BuildError::IncompleteCondition));
    }

    #[test]
    fn test_delete_in_list() {
        let query = DeleteQueryBuilder::new("tracks")
            .where_(where_("id").is_in([1, 2]))
            .build();
        assert_eq!(query.text(), "DELETE FROM tracks WHERE id IN (?, ?)");
        assert_bindable(&query);
    }
}
