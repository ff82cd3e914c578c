//! Squeeb - a small ORM over an embedded SQLite database
//!
//! Queries are described with the builders of [`squeeb_core`] (re-exported
//! here) and executed through an [`Executor`]: either a pooled [`Database`]
//! or an explicit [`Transaction`]. Tables are declared once as
//! [`TableSchema`]s in a [`SchemaRegistry`], created with
//! [`Database::init_tables`], and mapped onto serde structs by [`Model`].
//!
//! ```no_run
//! use squeeb::prelude::*;
//!
//! # async fn demo() -> squeeb::Result<()> {
//! let mut db = Database::connect(&DatabaseConfig::new("music")).await?;
//! let rows = db
//!     .fetch_all(&select("albums").where_(where_("year").less_than(1975)).build())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod model;
pub mod row;
pub mod transaction;

pub use config::DatabaseConfig;
pub use database::Database;
pub use error::{Error, Result};
pub use executor::Executor;
pub use model::{Model, ModelList};
pub use row::Row;
pub use transaction::{transaction, BoxFuture, Transaction};

pub use squeeb_core;
pub use squeeb_core::{
    and_group, delete, insert, or_group, select, update, where_, BuildError, Column,
    ColumnCache, Constraint, DataType, ForeignKey, KeyAction, PrimaryKey, Query, QueryBuilder,
    SchemaRegistry, SortDirection, TableIndex, TableSchema, TransactionBehavior, Value, ValueMap,
};

/// Commonly used items
pub mod prelude {
    pub use crate::{Database, DatabaseConfig, Executor, Model, ModelList, Row, transaction};
    pub use squeeb_core::prelude::*;
}
