//! SQL comparison operators and boolean junctions

use std::fmt::{self, Display};

/// Comparison operator of a single condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    Like,
    Glob,
    In,
    NotIn,
}

impl Operator {
    /// Get the SQL text of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanEquals => ">=",
            Operator::LessThan => "<",
            Operator::LessThanEquals => "<=",
            Operator::Like => "LIKE",
            Operator::Glob => "GLOB",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
        }
    }

    /// Whether the operator takes a parenthesized list of values
    pub fn is_list(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean connective joining two conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Junction {
    And,
    Or,
}

impl Junction {
    /// SQL keyword padded with spaces, ready to be placed between two predicates
    pub fn as_str(&self) -> &'static str {
        match self {
            Junction::And => " AND ",
            Junction::Or => " OR ",
        }
    }
}

impl Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for ORDER BY clauses, indexed columns and primary keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_text() {
        assert_eq!(Operator::Equals.as_str(), "=");
        assert_eq!(Operator::NotEquals.as_str(), "!=");
        assert_eq!(Operator::GreaterThanEquals.as_str(), ">=");
        assert_eq!(Operator::LessThanEquals.as_str(), "<=");
        assert_eq!(Operator::Glob.as_str(), "GLOB");
        assert_eq!(Operator::NotIn.as_str(), "NOT IN");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Operator::GreaterThan), ">");
        assert_eq!(format!("{}", Operator::Like), "LIKE");
        assert_eq!(format!("{}", Junction::And), " AND ");
        assert_eq!(format!("{}", Junction::Or), " OR ");
        assert_eq!(SortDirection::Desc.to_string(), "DESC");
    }

    #[test]
    fn test_list_operators() {
        assert!(Operator::In.is_list());
        assert!(Operator::NotIn.is_list());
        assert!(!Operator::Equals.is_list());
        assert!(!Operator::Like.is_list());
    }
}
