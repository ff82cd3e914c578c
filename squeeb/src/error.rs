//! Error types for squeeb

use squeeb_core::BuildError;
use thiserror::Error;

/// The main error type for database operations
#[derive(Error, Debug)]
pub enum Error {
    /// Error reported by the SQLite driver
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Condition, value-map or schema error
    #[error(transparent)]
    Core(#[from] squeeb_core::Error),

    /// A query that failed to build was handed to an executor
    #[error("Query build error: {0}")]
    Build(#[from] BuildError),

    /// An executor was handed a query with no SQL text
    #[error("Refusing to execute an empty statement")]
    EmptyStatement,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid database configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The operation needs a row that has been saved
    #[error("Model of table '{table}' has not been saved")]
    NotSaved { table: String },

    /// The row is no longer in the table
    #[error("No matching row found in table '{table}'")]
    RowNotFound { table: String },

    /// The transaction was already committed or rolled back
    #[error("Transaction has already finished")]
    TransactionFinished,
}

/// Convenience Result type for squeeb operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new not saved error
    pub fn not_saved(table: impl Into<String>) -> Self {
        Self::NotSaved {
            table: table.into(),
        }
    }

    /// Create a new row not found error
    pub fn row_not_found(table: impl Into<String>) -> Self {
        Self::RowNotFound {
            table: table.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_conversion() {
        let err: Error = BuildError::MissingWhereClause.into();
        assert!(matches!(err, Error::Build(BuildError::MissingWhereClause)));
        assert_eq!(err.to_string(), "Query build error: DELETE requires a WHERE clause");
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: Error = squeeb_core::Error::column_not_found("albums", "genre").into();
        assert_eq!(err.to_string(), "Column 'genre' not found in table 'albums'");
    }

    #[test]
    fn test_helpers() {
        assert_eq!(
            Error::not_saved("tracks").to_string(),
            "Model of table 'tracks' has not been saved"
        );
        assert_eq!(
            Error::row_not_found("tracks").to_string(),
            "No matching row found in table 'tracks'"
        );
        assert_eq!(
            Error::config("name must not be empty").to_string(),
            "Configuration error: name must not be empty"
        );
    }
}
