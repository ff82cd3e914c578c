//! WHERE clause expressions.
//!
//! Conditions are built fluently: [`where_`] names a column and returns a
//! [`PendingCondition`]; one of its comparison methods fixes the operator and
//! operand and yields an immutable [`Condition`]. A resolved condition can be
//! chained with [`Condition::and`] / [`Condition::or`] into a
//! [`ConditionSequence`], and fixed sets of conditions can be parenthesized
//! under a single junction with [`and_group`] / [`or_group`].
//!
//! ```
//! use squeeb_core::condition::where_;
//!
//! let predicate = where_("a").equals(1)
//!     .and().where_("b").greater_than(5)
//!     .or().where_("c").not_equals(2);
//!
//! assert_eq!(predicate.to_sql(), "a = ? AND b > ? OR c != ?");
//! assert_eq!(predicate.values(), vec![1.into(), 5.into(), 2.into()]);
//! ```
//!
//! A condition whose operand is [`Value::Null`] is a no-op: it renders as an
//! empty string, binds nothing, and is dropped from sequences and groups
//! together with the junction in front of it. This lets optional filters be
//! written as `where_("year").equals(maybe_year)`.

use crate::operator::{Junction, Operator};
use crate::{Error, Result, Value};
use std::fmt::{self, Display};

/// The right-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(Value),
    List(Vec<Value>),
}

/// Start a new condition on `column`
pub fn where_(column: impl Into<String>) -> PendingCondition {
    PendingCondition {
        column: column.into(),
    }
}

/// Parenthesize `members` joined with AND
pub fn and_group<I, P>(members: I) -> ConditionGroup
where
    I: IntoIterator<Item = P>,
    P: Into<Predicate>,
{
    ConditionGroup::new(Junction::And, members)
}

/// Parenthesize `members` joined with OR
pub fn or_group<I, P>(members: I) -> ConditionGroup
where
    I: IntoIterator<Item = P>,
    P: Into<Predicate>,
{
    ConditionGroup::new(Junction::Or, members)
}

macro_rules! comparison_methods {
    ($output:ty) => {
        /// `column = ?`
        pub fn equals(self, value: impl Into<Value>) -> $output {
            self.resolve(Operator::Equals, Operand::Scalar(value.into()))
        }

        /// `column != ?`
        pub fn not_equals(self, value: impl Into<Value>) -> $output {
            self.resolve(Operator::NotEquals, Operand::Scalar(value.into()))
        }

        /// `column > ?`
        pub fn greater_than(self, value: impl Into<Value>) -> $output {
            self.resolve(Operator::GreaterThan, Operand::Scalar(value.into()))
        }

        /// `column >= ?`
        pub fn greater_than_equals(self, value: impl Into<Value>) -> $output {
            self.resolve(Operator::GreaterThanEquals, Operand::Scalar(value.into()))
        }

        /// `column < ?`
        pub fn less_than(self, value: impl Into<Value>) -> $output {
            self.resolve(Operator::LessThan, Operand::Scalar(value.into()))
        }

        /// `column <= ?`
        pub fn less_than_equals(self, value: impl Into<Value>) -> $output {
            self.resolve(Operator::LessThanEquals, Operand::Scalar(value.into()))
        }

        /// `column LIKE ?`
        pub fn like(self, template: impl Into<Value>) -> $output {
            self.resolve(Operator::Like, Operand::Scalar(template.into()))
        }

        /// `column GLOB ?`
        pub fn glob(self, pattern: impl Into<Value>) -> $output {
            self.resolve(Operator::Glob, Operand::Scalar(pattern.into()))
        }

        /// `column IN (?, ...)`, one placeholder per value in iteration order
        pub fn is_in<I, T>(self, values: I) -> $output
        where
            I: IntoIterator<Item = T>,
            T: Into<Value>,
        {
            self.resolve(
                Operator::In,
                Operand::List(values.into_iter().map(Into::into).collect()),
            )
        }

        /// `column NOT IN (?, ...)`, one placeholder per value in iteration order
        pub fn is_not_in<I, T>(self, values: I) -> $output
        where
            I: IntoIterator<Item = T>,
            T: Into<Value>,
        {
            self.resolve(
                Operator::NotIn,
                Operand::List(values.into_iter().map(Into::into).collect()),
            )
        }
    };
}

/// A condition whose column is known but whose operator and value are not
#[derive(Debug)]
#[must_use = "a pending condition does nothing until a comparison method is called"]
pub struct PendingCondition {
    column: String,
}

impl PendingCondition {
    fn resolve(self, operator: Operator, operand: Operand) -> Condition {
        Condition {
            column: self.column,
            operator,
            operand,
        }
    }

    comparison_methods!(Condition);
}

/// A single resolved `column OP value` comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: String,
    operator: Operator,
    operand: Operand,
}

impl Condition {
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// Whether this condition has no value and renders as nothing
    pub fn is_noop(&self) -> bool {
        matches!(self.operand, Operand::Scalar(Value::Null))
    }

    /// Start a sequence `self AND ...`
    pub fn and(self) -> ConditionSequence {
        ConditionSequence::seeded(Predicate::Condition(self), Junction::And)
    }

    /// Start a sequence `self OR ...`
    pub fn or(self) -> ConditionSequence {
        ConditionSequence::seeded(Predicate::Condition(self), Junction::Or)
    }

    pub fn to_sql(&self) -> String {
        if self.is_noop() {
            return String::new();
        }
        match &self.operand {
            Operand::List(values) => format!(
                "{} {} ({})",
                self.column,
                self.operator,
                placeholders(values.len())
            ),
            Operand::Scalar(_) => format!("{} {} ?", self.column, self.operator),
        }
    }

    /// Bound values in placeholder order
    pub fn values(&self) -> Vec<Value> {
        if self.is_noop() {
            return Vec::new();
        }
        match &self.operand {
            Operand::Scalar(value) => vec![value.clone()],
            Operand::List(values) => values.clone(),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Term(Predicate),
    Junction(Junction),
}

/// Conditions and groups alternating with junctions.
///
/// A sequence always starts with a term. It is "ready for a condition"
/// exactly when its last element is a junction; a ready sequence is
/// incomplete, renders as an empty string and binds nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionSequence {
    items: Vec<Item>,
}

impl ConditionSequence {
    fn seeded(first: Predicate, junction: Junction) -> Self {
        Self {
            items: vec![Item::Term(first), Item::Junction(junction)],
        }
    }

    pub fn is_ready_for_condition(&self) -> bool {
        matches!(self.items.last(), Some(Item::Junction(_)))
    }

    /// Append a junction, failing if the sequence is still waiting for a condition
    pub fn try_and(self) -> Result<Self> {
        self.join(Junction::And)
    }

    /// Append a junction, failing if the sequence is still waiting for a condition
    pub fn try_or(self) -> Result<Self> {
        self.join(Junction::Or)
    }

    /// Append `AND`.
    ///
    /// # Panics
    ///
    /// Panics with [`Error::ConditionSequenceOutOfOrder`] if the sequence
    /// already ends with a junction.
    #[track_caller]
    pub fn and(self) -> Self {
        out_of_order(self.try_and())
    }

    /// Append `OR`.
    ///
    /// # Panics
    ///
    /// Panics with [`Error::ConditionSequenceOutOfOrder`] if the sequence
    /// already ends with a junction.
    #[track_caller]
    pub fn or(self) -> Self {
        out_of_order(self.try_or())
    }

    /// Start the next condition, failing unless the sequence ends with a junction
    pub fn try_where(self, column: impl Into<String>) -> Result<PendingSequence> {
        if !self.is_ready_for_condition() {
            return Err(Error::ConditionSequenceOutOfOrder);
        }
        Ok(PendingSequence {
            sequence: self,
            column: column.into(),
        })
    }

    /// Start the next condition.
    ///
    /// # Panics
    ///
    /// Panics with [`Error::ConditionSequenceOutOfOrder`] unless the sequence
    /// ends with a junction.
    #[track_caller]
    pub fn where_(self, column: impl Into<String>) -> PendingSequence {
        out_of_order(self.try_where(column))
    }

    /// Append an already resolved condition, group or sequence
    pub fn try_where_predicate(mut self, predicate: impl Into<Predicate>) -> Result<Self> {
        if !self.is_ready_for_condition() {
            return Err(Error::ConditionSequenceOutOfOrder);
        }
        self.items.push(Item::Term(predicate.into()));
        Ok(self)
    }

    /// Append an already resolved condition, group or sequence.
    ///
    /// # Panics
    ///
    /// Panics with [`Error::ConditionSequenceOutOfOrder`] unless the sequence
    /// ends with a junction.
    #[track_caller]
    pub fn where_predicate(self, predicate: impl Into<Predicate>) -> Self {
        out_of_order(self.try_where_predicate(predicate))
    }

    fn join(mut self, junction: Junction) -> Result<Self> {
        if self.is_ready_for_condition() {
            return Err(Error::ConditionSequenceOutOfOrder);
        }
        self.items.push(Item::Junction(junction));
        Ok(self)
    }

    fn terms(&self) -> Vec<(Option<Junction>, &Predicate)> {
        let mut terms = Vec::new();
        let mut pending = None;
        for item in &self.items {
            match item {
                Item::Junction(junction) => pending = Some(*junction),
                Item::Term(predicate) => terms.push((pending.take(), predicate)),
            }
        }
        terms
    }

    fn render(&self) -> (String, usize) {
        if self.is_ready_for_condition() {
            return (String::new(), 0);
        }
        render_terms(self.terms())
    }

    pub fn to_sql(&self) -> String {
        self.render().0
    }

    /// Bound values in placeholder order
    pub fn values(&self) -> Vec<Value> {
        if self.is_ready_for_condition() {
            return Vec::new();
        }
        self.terms()
            .into_iter()
            .flat_map(|(_, predicate)| predicate.values())
            .collect()
    }
}

impl Display for ConditionSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// A sequence waiting for the comparison of its newest condition
#[derive(Debug)]
#[must_use = "a pending condition does nothing until a comparison method is called"]
pub struct PendingSequence {
    sequence: ConditionSequence,
    column: String,
}

impl PendingSequence {
    fn resolve(mut self, operator: Operator, operand: Operand) -> ConditionSequence {
        self.sequence
            .items
            .push(Item::Term(Predicate::Condition(Condition {
                column: self.column,
                operator,
                operand,
            })));
        self.sequence
    }

    comparison_methods!(ConditionSequence);
}

/// A fixed list of predicates joined by one junction and parenthesized as a unit
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionGroup {
    junction: Junction,
    members: Vec<Predicate>,
}

impl ConditionGroup {
    pub fn new<I, P>(junction: Junction, members: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Predicate>,
    {
        Self {
            junction,
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn junction(&self) -> Junction {
        self.junction
    }

    pub fn members(&self) -> &[Predicate] {
        &self.members
    }

    /// Start a sequence `(group) AND ...`
    pub fn and(self) -> ConditionSequence {
        self.join(Junction::And)
    }

    /// Start a sequence `(group) OR ...`
    pub fn or(self) -> ConditionSequence {
        self.join(Junction::Or)
    }

    // Joining with the group's own junction needs no parentheses, so the
    // members are spliced straight into the sequence.
    fn join(self, junction: Junction) -> ConditionSequence {
        if self.junction != junction || self.members.is_empty() {
            return ConditionSequence::seeded(Predicate::Group(self), junction);
        }
        let mut items = Vec::with_capacity(self.members.len() * 2);
        for member in self.members {
            items.push(Item::Term(member));
            items.push(Item::Junction(junction));
        }
        ConditionSequence { items }
    }

    fn render(&self) -> (String, usize) {
        let terms = self
            .members
            .iter()
            .enumerate()
            .map(|(i, member)| ((i > 0).then_some(self.junction), member));
        render_terms(terms)
    }

    pub fn to_sql(&self) -> String {
        let (sql, count) = self.render();
        if count == 0 {
            return String::new();
        }
        format!("({})", sql)
    }

    /// Bound values in placeholder order
    pub fn values(&self) -> Vec<Value> {
        self.members.iter().flat_map(Predicate::values).collect()
    }
}

impl Display for ConditionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Any resolved boolean expression that can be used as a WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Condition(Condition),
    Sequence(ConditionSequence),
    Group(ConditionGroup),
}

impl Predicate {
    pub fn to_sql(&self) -> String {
        match self {
            Predicate::Condition(condition) => condition.to_sql(),
            Predicate::Sequence(sequence) => sequence.to_sql(),
            Predicate::Group(group) => group.to_sql(),
        }
    }

    /// Bound values in placeholder order
    pub fn values(&self) -> Vec<Value> {
        match self {
            Predicate::Condition(condition) => condition.values(),
            Predicate::Sequence(sequence) => sequence.values(),
            Predicate::Group(group) => group.values(),
        }
    }

    /// Whether the predicate renders as nothing
    pub fn is_empty(&self) -> bool {
        self.to_sql().is_empty()
    }

    /// Start a sequence `self AND ...`
    ///
    /// # Panics
    ///
    /// Panics if `self` is a sequence that already ends with a junction.
    #[track_caller]
    pub fn and(self) -> ConditionSequence {
        match self {
            Predicate::Condition(condition) => condition.and(),
            Predicate::Group(group) => group.and(),
            Predicate::Sequence(sequence) => sequence.and(),
        }
    }

    /// Start a sequence `self OR ...`
    ///
    /// # Panics
    ///
    /// Panics if `self` is a sequence that already ends with a junction.
    #[track_caller]
    pub fn or(self) -> ConditionSequence {
        match self {
            Predicate::Condition(condition) => condition.or(),
            Predicate::Group(group) => group.or(),
            Predicate::Sequence(sequence) => sequence.or(),
        }
    }

    // Nested sequences with more than one term keep their own precedence.
    fn to_nested_sql(&self) -> String {
        match self {
            Predicate::Sequence(sequence) => {
                let (sql, count) = sequence.render();
                if count > 1 {
                    format!("({})", sql)
                } else {
                    sql
                }
            }
            other => other.to_sql(),
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl From<Condition> for Predicate {
    fn from(condition: Condition) -> Self {
        Predicate::Condition(condition)
    }
}

impl From<ConditionSequence> for Predicate {
    fn from(sequence: ConditionSequence) -> Self {
        Predicate::Sequence(sequence)
    }
}

impl From<ConditionGroup> for Predicate {
    fn from(group: ConditionGroup) -> Self {
        Predicate::Group(group)
    }
}

/// Comma separated `?` placeholders
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

// Renders the non-empty terms, each preceded by its own junction. A term that
// renders empty is skipped together with the junction in front of it.
fn render_terms<'a, I>(terms: I) -> (String, usize)
where
    I: IntoIterator<Item = (Option<Junction>, &'a Predicate)>,
{
    let mut sql = String::new();
    let mut count = 0;
    for (junction, predicate) in terms {
        let fragment = predicate.to_nested_sql();
        if fragment.is_empty() {
            continue;
        }
        if count > 0 {
            sql.push_str(junction.unwrap_or(Junction::And).as_str());
        }
        sql.push_str(&fragment);
        count += 1;
    }
    (sql, count)
}

#[track_caller]
fn out_of_order<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{}", err),
    }
}
