//! Squeeb Core - condition, value-map and SQL query builders for SQLite
//!
//! This crate turns composable predicate and value-map objects into
//! parameterized SQL text plus positional arguments, and describes tables
//! declaratively so CREATE TABLE / CREATE INDEX statements can be derived
//! from them. It performs no I/O; executing a [`Query`] is left to the
//! `squeeb` crate.
//!
//! ```
//! use squeeb_core::{update, where_, QueryBuilder, Value};
//!
//! let query = update("albums")
//!     .values([("title", "Low")])
//!     .where_(where_("id").equals(5))
//!     .build();
//!
//! assert_eq!(query.text(), "UPDATE albums SET title = ? WHERE id = ?");
//! assert_eq!(query.args(), &[Value::from("Low"), Value::Integer(5)]);
//! ```

pub mod builder;
pub mod condition;
pub mod error;
pub mod operator;
pub mod schema;
pub mod value;
pub mod value_map;

// Re-export main types
pub use builder::{
    ArgKind, BeginTransaction, CommitTransaction, CreateIndexQueryBuilder, CreateTableQueryBuilder,
    DeleteQueryBuilder, DropTableQueryBuilder, InsertQueryBuilder, PragmaQueryBuilder, Query,
    QueryBuilder, ReleaseSavepoint, RollbackTransaction, Savepoint, SelectQueryBuilder,
    TransactionBehavior, UpdateQueryBuilder,
};
pub use condition::{
    and_group, or_group, where_, Condition, ConditionGroup, ConditionSequence, Predicate,
};
pub use error::{BuildError, Error, Result};
pub use operator::{Junction, Operator, SortDirection};
pub use schema::{
    CollateSequence, Column, ColumnCache, ConflictClause, Constraint, DataType, DefaultValue,
    ForeignKey, IndexedColumn, KeyAction, PrimaryKey, SchemaRegistry, TableIndex, TableSchema,
};
pub use value::Value;
pub use value_map::{ValueMap, ValueMapGroup, Values};

/// Start a SELECT on `table`
pub fn select(table: &str) -> SelectQueryBuilder {
    SelectQueryBuilder::new(table)
}

/// Start an INSERT into `table`
pub fn insert(table: &str) -> InsertQueryBuilder {
    InsertQueryBuilder::new(table)
}

/// Start an UPDATE of `table`
pub fn update(table: &str) -> UpdateQueryBuilder {
    UpdateQueryBuilder::new(table)
}

/// Start a DELETE from `table`
pub fn delete(table: &str) -> DeleteQueryBuilder {
    DeleteQueryBuilder::new(table)
}

/// Commonly used items
pub mod prelude {
    pub use crate::{
        and_group, delete, insert, or_group, select, update, where_, Column, Constraint, DataType,
        ForeignKey, KeyAction, PrimaryKey, Query, QueryBuilder, SchemaRegistry, SortDirection,
        TableIndex, TableSchema, Value, ValueMap,
    };
}
