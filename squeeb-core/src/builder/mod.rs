//! Query builder module
//!
//! Every statement has its own builder. A builder collects a table name, an
//! optional [`Values`](crate::Values) payload and an optional WHERE
//! [`Predicate`], and [`QueryBuilder::build`] turns them into a [`Query`]:
//! the SQL text plus its positional arguments, or the reason it could not be
//! built.

pub mod create_index;
pub mod create_table;
pub mod delete;
pub mod drop_table;
pub mod insert;
pub mod pragma;
pub mod select;
pub mod transaction;
pub mod update;

pub use create_index::CreateIndexQueryBuilder;
pub use create_table::CreateTableQueryBuilder;
pub use delete::DeleteQueryBuilder;
pub use drop_table::DropTableQueryBuilder;
pub use insert::InsertQueryBuilder;
pub use pragma::PragmaQueryBuilder;
pub use select::SelectQueryBuilder;
pub use transaction::{
    BeginTransaction, CommitTransaction, ReleaseSavepoint, RollbackTransaction, Savepoint,
    TransactionBehavior,
};
pub use update::UpdateQueryBuilder;

use crate::condition::Predicate;
use crate::error::BuildError;
use crate::Value;
use tracing::{debug, warn};

/// Argument sources a statement binds, in placeholder order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Value,
    Where,
}

/// The result of a build: SQL text with its bound arguments, or an error.
///
/// A query carrying an error has no usable text and must not be executed.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    text: String,
    args: Vec<Value>,
    error: Option<BuildError>,
}

impl Query {
    pub fn new(text: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            args,
            error: None,
        }
    }

    pub fn failed(error: BuildError) -> Self {
        Self {
            text: String::new(),
            args: Vec::new(),
            error: Some(error),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn error(&self) -> Option<&BuildError> {
        self.error.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Split into text and arguments, surfacing the build error if there is one
    pub fn into_parts(self) -> Result<(String, Vec<Value>), BuildError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok((self.text, self.args)),
        }
    }
}

/// Common trait for all statement builders
pub trait QueryBuilder {
    /// Target table; `None` for statements that do not name one
    fn table_name(&self) -> Option<&str>;

    /// Which argument lists this statement binds, in placeholder order
    fn needed_args(&self) -> &[ArgKind] {
        &[]
    }

    /// Check the builder state before rendering
    fn validate(&self) -> Result<(), BuildError> {
        Ok(())
    }

    /// Render the SQL text
    fn to_sql(&self) -> String;

    fn value_args(&self) -> Vec<Value> {
        Vec::new()
    }

    fn where_args(&self) -> Vec<Value> {
        Vec::new()
    }

    /// All bound arguments, concatenated in [`QueryBuilder::needed_args`] order
    fn parameters(&self) -> Vec<Value> {
        let mut args = Vec::new();
        for kind in self.needed_args() {
            match kind {
                ArgKind::Value => args.extend(self.value_args()),
                ArgKind::Where => args.extend(self.where_args()),
            }
        }
        args
    }

    /// Validate and render the statement
    fn build(&self) -> Query {
        if let Some(table) = self.table_name() {
            if table.trim().is_empty() {
                return build_failed(BuildError::MissingTableName);
            }
        }
        if let Err(error) = self.validate() {
            return build_failed(error);
        }

        let text = self.to_sql();
        let args = self.parameters();
        debug!(sql = %text, args = args.len(), "built query");
        Query::new(text, args)
    }
}

fn build_failed(error: BuildError) -> Query {
    warn!(%error, "query build failed");
    Query::failed(error)
}

/// ` WHERE ...`, or nothing when the predicate is absent or renders empty
pub(crate) fn where_sql(predicate: Option<&Predicate>) -> String {
    match predicate.map(Predicate::to_sql) {
        Some(sql) if !sql.is_empty() => format!(" WHERE {}", sql),
        _ => String::new(),
    }
}

pub(crate) fn where_values(predicate: Option<&Predicate>) -> Vec<Value> {
    predicate.map(Predicate::values).unwrap_or_default()
}

/// An explicitly set where-clause must render something
pub(crate) fn check_where(predicate: Option<&Predicate>) -> Result<(), BuildError> {
    match predicate {
        Some(predicate) if predicate.is_empty() => Err(BuildError::IncompleteCondition),
        _ => Ok(()),
    }
}
