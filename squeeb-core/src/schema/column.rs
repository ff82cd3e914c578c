//! Column descriptors and the descriptor cache

use super::constraint::{Constraint, DataType, ForeignKey, PrimaryKey};
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Arc;

/// A typed column: data type, optional name and its constraint clauses.
///
/// An unnamed column takes its field name when added to a
/// [`TableSchema`](super::TableSchema).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    data_type: DataType,
    name: Option<String>,
    constraints: Vec<Constraint>,
}

impl Column {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            name: None,
            constraints: Vec::new(),
        }
    }

    pub fn integer() -> Self {
        Self::new(DataType::Integer)
    }

    pub fn real() -> Self {
        Self::new(DataType::Real)
    }

    pub fn text() -> Self {
        Self::new(DataType::Text)
    }

    pub fn blob() -> Self {
        Self::new(DataType::Blob)
    }

    /// Set the SQL column name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a constraint clause; clauses render in the order they are added
    pub fn constraint(mut self, constraint: impl Into<Constraint>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn primary_key(&self) -> Option<&PrimaryKey> {
        self.constraints.iter().find_map(|constraint| match constraint {
            Constraint::PrimaryKey(key) => Some(key),
            _ => None,
        })
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key().is_some()
    }

    pub fn foreign_key(&self) -> Option<&ForeignKey> {
        self.constraints.iter().find_map(|constraint| match constraint {
            Constraint::ForeignKey(key) => Some(key),
            _ => None,
        })
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{} ", name)?;
        }
        write!(f, "{}", self.data_type)?;
        for constraint in &self.constraints {
            write!(f, " {}", constraint)?;
        }
        Ok(())
    }
}

/// Structurally identical columns share one descriptor
#[derive(Debug, Default)]
pub struct ColumnCache {
    columns: HashMap<Column, Arc<Column>>,
}

impl ColumnCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared descriptor for `column`, creating it on first use
    pub fn intern(&mut self, column: Column) -> Arc<Column> {
        if let Some(shared) = self.columns.get(&column) {
            return Arc::clone(shared);
        }
        let shared = Arc::new(column.clone());
        self.columns.insert(column, Arc::clone(&shared));
        shared
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
