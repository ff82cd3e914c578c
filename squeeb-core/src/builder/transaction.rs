//! Transaction control statements

use super::QueryBuilder;
use crate::error::BuildError;
use std::fmt::{self, Display};

/// Locking behavior of `BEGIN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionBehavior {
    Deferred,
    Immediate,
    Exclusive,
}

impl Display for TransactionBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionBehavior::Deferred => write!(f, "DEFERRED"),
            TransactionBehavior::Immediate => write!(f, "IMMEDIATE"),
            TransactionBehavior::Exclusive => write!(f, "EXCLUSIVE"),
        }
    }
}

/// `BEGIN [DEFERRED|IMMEDIATE|EXCLUSIVE] TRANSACTION`
#[derive(Debug, Clone, Default)]
pub struct BeginTransaction {
    behavior: Option<TransactionBehavior>,
}

impl BeginTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: TransactionBehavior) -> Self {
        Self {
            behavior: Some(behavior),
        }
    }

    pub fn behavior(&self) -> Option<TransactionBehavior> {
        self.behavior
    }
}

impl QueryBuilder for BeginTransaction {
    fn table_name(&self) -> Option<&str> {
        None
    }

    fn to_sql(&self) -> String {
        match self.behavior {
            Some(behavior) => format!("BEGIN {} TRANSACTION", behavior),
            None => "BEGIN TRANSACTION".to_string(),
        }
    }
}

/// `COMMIT TRANSACTION`
#[derive(Debug, Clone, Default)]
pub struct CommitTransaction;

impl CommitTransaction {
    pub fn new() -> Self {
        Self
    }
}

impl QueryBuilder for CommitTransaction {
    fn table_name(&self) -> Option<&str> {
        None
    }

    fn to_sql(&self) -> String {
        "COMMIT TRANSACTION".to_string()
    }
}

/// `ROLLBACK TRANSACTION [TO SAVEPOINT name]`
#[derive(Debug, Clone, Default)]
pub struct RollbackTransaction {
    savepoint: Option<String>,
}

impl RollbackTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll back to a savepoint instead of the whole transaction
    pub fn to_savepoint(name: impl Into<String>) -> Self {
        Self {
            savepoint: Some(name.into()),
        }
    }
}

impl QueryBuilder for RollbackTransaction {
    fn table_name(&self) -> Option<&str> {
        None
    }

    fn validate(&self) -> Result<(), BuildError> {
        match &self.savepoint {
            Some(name) => check_savepoint_name(name),
            None => Ok(()),
        }
    }

    fn to_sql(&self) -> String {
        match &self.savepoint {
            Some(name) => format!("ROLLBACK TRANSACTION TO SAVEPOINT {}", name),
            None => "ROLLBACK TRANSACTION".to_string(),
        }
    }
}

/// `SAVEPOINT name`
#[derive(Debug, Clone)]
pub struct Savepoint {
    name: String,
}

impl Savepoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl QueryBuilder for Savepoint {
    fn table_name(&self) -> Option<&str> {
        None
    }

    fn validate(&self) -> Result<(), BuildError> {
        check_savepoint_name(&self.name)
    }

    fn to_sql(&self) -> String {
        format!("SAVEPOINT {}", self.name)
    }
}

/// `RELEASE SAVEPOINT name`
#[derive(Debug, Clone)]
pub struct ReleaseSavepoint {
    name: String,
}

impl ReleaseSavepoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl QueryBuilder for ReleaseSavepoint {
    fn table_name(&self) -> Option<&str> {
        None
    }

    fn validate(&self) -> Result<(), BuildError> {
        check_savepoint_name(&self.name)
    }

    fn to_sql(&self) -> String {
        format!("RELEASE SAVEPOINT {}", self.name)
    }
}

fn check_savepoint_name(name: &str) -> Result<(), BuildError> {
    if name.trim().is_empty() {
        return Err(BuildError::MissingSavepointName);
    }
    Ok(())
}
