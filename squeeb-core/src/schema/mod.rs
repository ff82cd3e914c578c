//! Declarative table schemas
//!
//! A table is declared once with [`TableSchema::builder`], listing each
//! struct field with its [`Column`] descriptor, and registered in a
//! [`SchemaRegistry`] under the database it belongs to. The registry interns
//! structurally identical columns through its [`ColumnCache`] and decides the
//! order tables must be created in.

mod column;
mod constraint;
mod index;
mod registry;
mod table;

pub use column::{Column, ColumnCache};
pub use constraint::{
    CollateSequence, ConflictClause, Constraint, DataType, DefaultValue, ForeignKey, KeyAction,
    PrimaryKey,
};
pub use index::{default_index_name, IndexedColumn, TableIndex};
pub use registry::SchemaRegistry;
pub use table::{TableSchema, TableSchemaBuilder};
