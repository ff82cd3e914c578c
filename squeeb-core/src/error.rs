//! Error types for squeeb-core

use thiserror::Error;

/// The main error type for condition, value-map and schema operations
#[derive(Error, Debug)]
pub enum Error {
    /// `and`/`or`/`where_` called while the sequence was not in the right state
    #[error("Condition sequence out of order")]
    ConditionSequenceOutOfOrder,

    /// A SET clause was requested from a multi-row value group
    #[error("SET clause requested from a multi-row value group")]
    ValueSetOnGroup,

    /// A query failed to build
    #[error("Query build error: {0}")]
    Build(#[from] BuildError),

    /// Invalid table schema declaration
    #[error("Invalid schema for table '{table}': {message}")]
    InvalidSchema { table: String, message: String },

    /// Column not found error
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// Table not found error
    #[error("Table '{table}' not found in database '{database}'")]
    TableNotFound { database: String, table: String },

    /// A foreign key points at a table registered under another database
    #[error(
        "Foreign key '{table}.{column}' references table '{foreign_table}' which is not part of database '{database}'"
    )]
    ForeignKeyOutsideDatabase {
        database: String,
        table: String,
        column: String,
        foreign_table: String,
    },

    /// Tables reference each other in a loop
    #[error("Foreign key cycle between tables: {}", tables.join(", "))]
    ForeignKeyCycle { tables: Vec<String> },
}

/// Errors captured inside a [`Query`](crate::Query) instead of being returned.
///
/// A query carrying one of these must not be executed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("No table name provided.")]
    MissingTableName,

    #[error("DELETE requires a WHERE clause")]
    MissingWhereClause,

    #[error("WHERE clause is incomplete or renders empty")]
    IncompleteCondition,

    #[error("{statement} requires at least one column value")]
    EmptyValues { statement: &'static str },

    #[error("Row {row} does not have the same columns as the first row")]
    MismatchedColumns { row: usize },

    #[error("UPDATE cannot take a multi-row value group")]
    ValueSetOnGroup,

    #[error("CREATE TABLE requires at least one column")]
    NoColumns,

    #[error("Column definition {index} has no name")]
    UnnamedColumn { index: usize },

    #[error("CREATE INDEX requires at least one indexed column")]
    NoIndexedColumns,

    #[error("Savepoint name must not be empty")]
    MissingSavepointName,

    #[error("PRAGMA requires a command")]
    MissingPragmaCommand,
}

/// Convenience Result type for squeeb-core operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid schema error
    pub fn invalid_schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a new column not found error
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create a new table not found error
    pub fn table_not_found(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self::TableNotFound {
            database: database.into(),
            table: table.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_error_message() {
        let err = Error::ConditionSequenceOutOfOrder;
        assert_eq!(err.to_string(), "Condition sequence out of order");
    }

    #[test]
    fn test_build_error_conversion() {
        let err: Error = BuildError::MissingTableName.into();
        assert!(matches!(err, Error::Build(BuildError::MissingTableName)));
        assert_eq!(err.to_string(), "Query build error: No table name provided.");
    }

    #[test]
    fn test_column_not_found_error() {
        let err = Error::column_not_found("artists", "genre");
        assert_eq!(err.to_string(), "Column 'genre' not found in table 'artists'");
    }

    #[test]
    fn test_foreign_key_cycle_message() {
        let err = Error::ForeignKeyCycle {
            tables: vec!["albums".to_string(), "tracks".to_string()],
        };
        assert_eq!(err.to_string(), "Foreign key cycle between tables: albums, tracks");
    }

    #[test]
    fn test_empty_values_message() {
        let err = BuildError::EmptyValues { statement: "INSERT" };
        assert_eq!(err.to_string(), "INSERT requires at least one column value");
    }
}
