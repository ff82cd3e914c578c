//! Column data types and constraint clauses

use super::TableSchema;
use crate::operator::SortDirection;
use crate::{Error, Result, Value};
use std::fmt::{self, Display};

/// SQLite storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Null => "NULL",
            DataType::Integer => "INTEGER",
            DataType::Real => "REAL",
            DataType::Text => "TEXT",
            DataType::Blob => "BLOB",
        };
        f.write_str(name)
    }
}

/// Conflict resolution algorithm, rendered as `ON CONFLICT X`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictClause {
    Rollback,
    Abort,
    Fail,
    Ignore,
    Replace,
}

impl Display for ConflictClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let algorithm = match self {
            ConflictClause::Rollback => "ROLLBACK",
            ConflictClause::Abort => "ABORT",
            ConflictClause::Fail => "FAIL",
            ConflictClause::Ignore => "IGNORE",
            ConflictClause::Replace => "REPLACE",
        };
        write!(f, "ON CONFLICT {}", algorithm)
    }
}

/// Foreign key action for ON DELETE / ON UPDATE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    NoAction,
    Restrict,
    SetNull,
    SetDefault,
    Cascade,
}

impl Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            KeyAction::NoAction => "NO ACTION",
            KeyAction::Restrict => "RESTRICT",
            KeyAction::SetNull => "SET NULL",
            KeyAction::SetDefault => "SET DEFAULT",
            KeyAction::Cascade => "CASCADE",
        };
        f.write_str(action)
    }
}

/// Built-in collating sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollateSequence {
    Binary,
    NoCase,
    RTrim,
}

impl Display for CollateSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollateSequence::Binary => "BINARY",
            CollateSequence::NoCase => "NOCASE",
            CollateSequence::RTrim => "RTRIM",
        };
        f.write_str(name)
    }
}

/// `PRIMARY KEY [ASC|DESC] [ON CONFLICT X] [AUTOINCREMENT] [UNIQUE]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PrimaryKey {
    order: Option<SortDirection>,
    conflict: Option<ConflictClause>,
    autoincrement: bool,
    unique: bool,
}

impl PrimaryKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(mut self, order: SortDirection) -> Self {
        self.order = Some(order);
        self
    }

    pub fn on_conflict(mut self, conflict: ConflictClause) -> Self {
        self.conflict = Some(conflict);
        self
    }

    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn is_autoincrement(&self) -> bool {
        self.autoincrement
    }
}

impl Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PRIMARY KEY")?;
        if let Some(order) = self.order {
            write!(f, " {}", order)?;
        }
        if let Some(conflict) = self.conflict {
            write!(f, " {}", conflict)?;
        }
        if self.autoincrement {
            f.write_str(" AUTOINCREMENT")?;
        }
        if self.unique {
            f.write_str(" UNIQUE")?;
        }
        Ok(())
    }
}

/// `REFERENCES "table"("column") [ON DELETE X] [ON UPDATE Y]`
///
/// The referenced column name is resolved once, when the key is declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForeignKey {
    table: String,
    column: String,
    on_delete: Option<KeyAction>,
    on_update: Option<KeyAction>,
}

impl ForeignKey {
    /// Reference a column of `schema`, looked up by field or column name
    pub fn references(schema: &TableSchema, column: &str) -> Result<Self> {
        let column_name = schema
            .column_name(column)
            .or_else(|| schema.field_name(column).map(|_| column))
            .ok_or_else(|| Error::column_not_found(schema.name(), column))?;
        Ok(Self {
            table: schema.name().to_string(),
            column: column_name.to_string(),
            on_delete: None,
            on_update: None,
        })
    }

    pub fn on_delete(mut self, action: KeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: KeyAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// The referenced table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The referenced column
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REFERENCES \"{}\"(\"{}\")", self.table, self.column)?;
        if let Some(action) = self.on_delete {
            write!(f, " ON DELETE {}", action)?;
        }
        if let Some(action) = self.on_update {
            write!(f, " ON UPDATE {}", action)?;
        }
        Ok(())
    }
}

/// A DEFAULT clause. Literal values are stored already rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefaultValue {
    Literal(String),
    Expression(String),
    CurrentTime,
    CurrentDate,
    CurrentTimestamp,
    Null,
}

impl DefaultValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Null => DefaultValue::Null,
            value => DefaultValue::Literal(value.to_sql_literal()),
        }
    }

    pub fn expression(expression: impl Into<String>) -> Self {
        DefaultValue::Expression(expression.into())
    }
}

impl Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(literal) => write!(f, "DEFAULT {}", literal),
            DefaultValue::Expression(expression) => write!(f, "DEFAULT ({})", expression),
            DefaultValue::CurrentTime => f.write_str("DEFAULT CURRENT_TIME"),
            DefaultValue::CurrentDate => f.write_str("DEFAULT CURRENT_DATE"),
            DefaultValue::CurrentTimestamp => f.write_str("DEFAULT CURRENT_TIMESTAMP"),
            DefaultValue::Null => f.write_str("DEFAULT NULL"),
        }
    }
}

/// A column constraint clause
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constraint {
    PrimaryKey(PrimaryKey),
    ForeignKey(ForeignKey),
    NotNull(Option<ConflictClause>),
    Unique(Option<ConflictClause>),
    Collate(CollateSequence),
    Default(DefaultValue),
}

impl Constraint {
    pub fn not_null() -> Self {
        Constraint::NotNull(None)
    }

    pub fn unique() -> Self {
        Constraint::Unique(None)
    }

    pub fn collate(sequence: CollateSequence) -> Self {
        Constraint::Collate(sequence)
    }

    pub fn default_value(value: impl Into<Value>) -> Self {
        Constraint::Default(DefaultValue::literal(value))
    }

    pub fn default_expression(expression: impl Into<String>) -> Self {
        Constraint::Default(DefaultValue::expression(expression))
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::PrimaryKey(key) => key.fmt(f),
            Constraint::ForeignKey(key) => key.fmt(f),
            Constraint::NotNull(conflict) => {
                f.write_str("NOT NULL")?;
                conflict.map_or(Ok(()), |conflict| write!(f, " {}", conflict))
            }
            Constraint::Unique(conflict) => {
                f.write_str("UNIQUE")?;
                conflict.map_or(Ok(()), |conflict| write!(f, " {}", conflict))
            }
            Constraint::Collate(sequence) => write!(f, "COLLATE {}", sequence),
            Constraint::Default(default) => default.fmt(f),
        }
    }
}

impl From<PrimaryKey> for Constraint {
    fn from(key: PrimaryKey) -> Self {
        Constraint::PrimaryKey(key)
    }
}

impl From<ForeignKey> for Constraint {
    fn from(key: ForeignKey) -> Self {
        Constraint::ForeignKey(key)
    }
}

impl From<DefaultValue> for Constraint {
    fn from(default: DefaultValue) -> Self {
        Constraint::Default(default)
    }
}

impl From<CollateSequence> for Constraint {
    fn from(sequence: CollateSequence) -> Self {
        Constraint::Collate(sequence)
    }
}
