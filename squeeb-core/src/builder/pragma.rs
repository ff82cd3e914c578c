//! PRAGMA statement builder module

use super::QueryBuilder;
use crate::error::BuildError;
use crate::Value;

/// `PRAGMA command`, `PRAGMA command(target)` or `PRAGMA command=value`.
///
/// PRAGMA arguments cannot be bound, so the value is rendered as a literal.
/// A target takes precedence over a value.
#[derive(Debug, Clone)]
pub struct PragmaQueryBuilder {
    command: String,
    target: Option<String>,
    value: Option<Value>,
}

impl PragmaQueryBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            target: None,
            value: None,
        }
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl QueryBuilder for PragmaQueryBuilder {
    fn table_name(&self) -> Option<&str> {
        None
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.command.trim().is_empty() {
            return Err(BuildError::MissingPragmaCommand);
        }
        Ok(())
    }

    fn to_sql(&self) -> String {
        match (&self.target, &self.value) {
            (Some(target), _) => format!("PRAGMA {}({})", self.command, target),
            (None, Some(value)) => format!("PRAGMA {}={}", self.command, value.to_sql_literal()),
            (None, None) => format!("PRAGMA {}", self.command),
        }
    }
}
