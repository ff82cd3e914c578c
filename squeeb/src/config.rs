//! Database configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// How to open one SQLite database.
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use squeeb::DatabaseConfig;
///
/// let config = DatabaseConfig::from_json_str(r#"{ "name": "music" }"#).unwrap();
/// assert_eq!(config.filename(), "music.db");
/// assert_eq!(config.connect_url(), "sqlite://music.db");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Name of the database grouping tables are registered under
    pub name: String,
    /// Database file; `{name}.db` when not set
    pub filename: Option<String>,
    /// Keep the database in memory instead of a file
    pub in_memory: bool,
    pub max_connections: u32,
    /// Enforce foreign key constraints
    pub foreign_keys: bool,
    pub create_if_missing: bool,
    pub busy_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            filename: None,
            in_memory: false,
            max_connections: 5,
            foreign_keys: true,
            create_if_missing: true,
            busy_timeout_secs: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A private in-memory database named `name`
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            in_memory: true,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_foreign_keys(mut self, foreign_keys: bool) -> Self {
        self.foreign_keys = foreign_keys;
        self
    }

    pub fn with_create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout_secs = timeout.as_secs();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::config("database name must not be empty"));
        }
        if self.max_connections == 0 {
            return Err(Error::config("max_connections must be at least 1"));
        }
        if let Some(filename) = &self.filename {
            if filename.trim().is_empty() {
                return Err(Error::config("filename must not be empty"));
            }
        }
        Ok(())
    }

    pub fn filename(&self) -> String {
        match &self.filename {
            Some(filename) => filename.clone(),
            None => format!("{}.db", self.name),
        }
    }

    pub fn connect_url(&self) -> String {
        if self.in_memory {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}", self.filename())
        }
    }

    pub fn connect_options(&self) -> Result<SqliteConnectOptions> {
        let options = SqliteConnectOptions::from_str(&self.connect_url())?
            .foreign_keys(self.foreign_keys)
            .create_if_missing(self.create_if_missing)
            .busy_timeout(Duration::from_secs(self.busy_timeout_secs));
        Ok(options)
    }

    // Every connection to `:memory:` is its own database, and closing the
    // last one discards it, so memory pools hold exactly one connection forever.
    pub fn pool_options(&self) -> SqlitePoolOptions {
        if self.in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(self.max_connections)
        }
    }
}
