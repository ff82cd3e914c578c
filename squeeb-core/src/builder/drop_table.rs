//! DROP TABLE query builder module

use super::QueryBuilder;

/// `DROP TABLE [IF EXISTS] T`
#[derive(Debug, Clone)]
pub struct DropTableQueryBuilder {
    table_name: String,
    if_exists: bool,
}

impl DropTableQueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table_name: table.into(),
            if_exists: false,
        }
    }

    pub fn if_exists(mut self, if_exists: bool) -> Self {
        self.if_exists = if_exists;
        self
    }
}

impl QueryBuilder for DropTableQueryBuilder {
    fn table_name(&self) -> Option<&str> {
        Some(&self.table_name)
    }

    fn to_sql(&self) -> String {
        if self.if_exists {
            format!("DROP TABLE IF EXISTS {}", self.table_name)
        } else {
            format!("DROP TABLE {}", self.table_name)
        }
    }
}
