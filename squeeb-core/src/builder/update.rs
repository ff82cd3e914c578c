//! UPDATE query builder module

use super::{check_where, where_sql, where_values, ArgKind, QueryBuilder};
use crate::condition::Predicate;
use crate::error::BuildError;
use crate::value_map::Values;
use crate::Value;

/// `UPDATE T SET a = ?, ... [WHERE W]`
///
/// SET values are bound before WHERE values.
#[derive(Debug, Clone)]
pub struct UpdateQueryBuilder {
    table_name: String,
    values: Option<Values>,
    where_clause: Option<Predicate>,
}

impl UpdateQueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table_name: table.into(),
            values: None,
            where_clause: None,
        }
    }

    pub fn values(mut self, values: impl Into<Values>) -> Self {
        self.values = Some(values.into());
        self
    }

    pub fn where_(mut self, predicate: impl Into<Predicate>) -> Self {
        self.where_clause = Some(predicate.into());
        self
    }
}

impl QueryBuilder for UpdateQueryBuilder {
    fn table_name(&self) -> Option<&str> {
        Some(&self.table_name)
    }

    fn needed_args(&self) -> &[ArgKind] {
        &[ArgKind::Value, ArgKind::Where]
    }

    fn validate(&self) -> Result<(), BuildError> {
        match &self.values {
            None => return Err(BuildError::EmptyValues { statement: "UPDATE" }),
            Some(Values::Group(_)) => return Err(BuildError::ValueSetOnGroup),
            Some(values) if values.is_empty() => {
                return Err(BuildError::EmptyValues { statement: "UPDATE" })
            }
            Some(Values::Single(_)) => {}
        }
        check_where(self.where_clause.as_ref())
    }

    fn to_sql(&self) -> String {
        let changes = self
            .values
            .as_ref()
            .and_then(|values| values.value_set_string().ok())
            .unwrap_or_default();
        format!(
            "UPDATE {} SET {}{}",
            self.table_name,
            changes,
            where_sql(self.where_clause.as_ref())
        )
    }

    fn value_args(&self) -> Vec<Value> {
        match &self.values {
            Some(Values::Single(map)) => map.values(),
            _ => Vec::new(),
        }
    }

    fn where_args(&self) -> Vec<Value> {
        where_values(self.where_clause.as_ref())
    }
}
