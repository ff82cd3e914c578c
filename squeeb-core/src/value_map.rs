//! Ordered column → value payloads for INSERT, UPDATE and SELECT

use crate::condition::placeholders;
use crate::error::BuildError;
use crate::{Error, Result, Value};
use indexmap::IndexMap;

/// A single row of column values, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    entries: IndexMap<String, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value. Re-inserting a column keeps its original position.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(column.into(), value.into())
    }

    /// Builder form of [`ValueMap::insert`]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.entries.shift_remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.entries.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `(a, b, c)`
    pub fn column_string(&self) -> String {
        format!("({})", self.column_list())
    }

    /// `a, b, c`
    pub fn column_list(&self) -> String {
        self.columns().collect::<Vec<_>>().join(", ")
    }

    /// `(?, ?, ?)`
    pub fn values_string(&self) -> String {
        format!("({})", placeholders(self.len()))
    }

    /// `a = ?, b = ?, c = ?`
    pub fn value_set_string(&self) -> String {
        self.columns()
            .map(|column| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Values in column order
    pub fn values(&self) -> Vec<Value> {
        self.entries.values().cloned().collect()
    }

    fn same_columns(&self, other: &ValueMap) -> bool {
        self.len() == other.len() && other.columns().all(|column| self.contains(column))
    }
}

impl<K, V> FromIterator<(K, V)> for ValueMap
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ValueMap
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl From<IndexMap<String, Value>> for ValueMap {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Rows for a multi-row INSERT.
///
/// The column order of every row is taken from the first row, so rows that
/// list the same columns in a different order still bind correctly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMapGroup {
    rows: Vec<ValueMap>,
}

impl ValueMapGroup {
    pub fn new(rows: Vec<ValueMap>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: impl Into<ValueMap>) {
        self.rows.push(row.into());
    }

    pub fn rows(&self) -> &[ValueMap] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column list of the first row, `(a, b)`
    pub fn column_string(&self) -> String {
        self.rows
            .first()
            .map(ValueMap::column_string)
            .unwrap_or_else(|| "()".to_string())
    }

    pub fn column_list(&self) -> String {
        self.rows
            .first()
            .map(ValueMap::column_list)
            .unwrap_or_default()
    }

    /// One placeholder tuple per row, `(?, ?), (?, ?)`
    pub fn values_string(&self) -> String {
        let width = self.rows.first().map(ValueMap::len).unwrap_or(0);
        let tuple = format!("({})", placeholders(width));
        vec![tuple; self.rows.len()].join(", ")
    }

    /// Values row by row, each row read in the first row's column order
    pub fn values(&self) -> Vec<Value> {
        let Some(first) = self.rows.first() else {
            return Vec::new();
        };
        self.rows
            .iter()
            .flat_map(move |row| {
                first
                    .columns()
                    .map(move |column| row.get(column).cloned().unwrap_or(Value::Null))
            })
            .collect()
    }

    /// Every row must carry exactly the first row's column set
    pub fn check_columns(&self) -> std::result::Result<(), BuildError> {
        let Some(first) = self.rows.first() else {
            return Ok(());
        };
        match self.rows.iter().position(|row| !first.same_columns(row)) {
            Some(row) => Err(BuildError::MismatchedColumns { row }),
            None => Ok(()),
        }
    }
}

impl From<Vec<ValueMap>> for ValueMapGroup {
    fn from(rows: Vec<ValueMap>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<ValueMap> for ValueMapGroup {
    fn from_iter<I: IntoIterator<Item = ValueMap>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The payload a builder was given: one row or several
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Single(ValueMap),
    Group(ValueMapGroup),
}

impl Values {
    pub fn is_empty(&self) -> bool {
        match self {
            Values::Single(map) => map.is_empty(),
            Values::Group(group) => group.rows().first().map_or(true, ValueMap::is_empty),
        }
    }

    pub fn column_string(&self) -> String {
        match self {
            Values::Single(map) => map.column_string(),
            Values::Group(group) => group.column_string(),
        }
    }

    pub fn column_list(&self) -> String {
        match self {
            Values::Single(map) => map.column_list(),
            Values::Group(group) => group.column_list(),
        }
    }

    pub fn values_string(&self) -> String {
        match self {
            Values::Single(map) => map.values_string(),
            Values::Group(group) => group.values_string(),
        }
    }

    /// SET clause text; a group has no meaningful SET clause
    pub fn value_set_string(&self) -> Result<String> {
        match self {
            Values::Single(map) => Ok(map.value_set_string()),
            Values::Group(_) => Err(Error::ValueSetOnGroup),
        }
    }

    pub fn values(&self) -> Vec<Value> {
        match self {
            Values::Single(map) => map.values(),
            Values::Group(group) => group.values(),
        }
    }
}

impl From<ValueMap> for Values {
    fn from(map: ValueMap) -> Self {
        Values::Single(map)
    }
}

impl From<ValueMapGroup> for Values {
    fn from(group: ValueMapGroup) -> Self {
        Values::Group(group)
    }
}

impl From<Vec<ValueMap>> for Values {
    fn from(rows: Vec<ValueMap>) -> Self {
        Values::Group(ValueMapGroup::new(rows))
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Values
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(entries: [(K, V); N]) -> Self {
        Values::Single(entries.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, year: i64) -> ValueMap {
        ValueMap::new().with("name", name).with("year", year)
    }

    #[test]
    fn test_value_map_keeps_insertion_order() {
        let map = ValueMap::from([("c", 3), ("a", 1), ("b", 2)]);
        assert_eq!(map.column_string(), "(c, a, b)");
        assert_eq!(map.column_list(), "c, a, b");
        assert_eq!(map.values_string(), "(?, ?, ?)");
        assert_eq!(
            map.values(),
            vec![Value::Integer(3), Value::Integer(1), Value::Integer(2)]
        );
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut map = row("Low", 1977);
        map.insert("name", "Heroes");
        assert_eq!(map.column_list(), "name, year");
        assert_eq!(map.get("name"), Some(&Value::from("Heroes")));
    }

    #[test]
    fn test_value_set_string() {
        let map = row("Low", 1977);
        assert_eq!(map.value_set_string(), "name = ?, year = ?");
    }

    #[test]
    fn test_from_iterator() {
        let map: ValueMap = vec![("title", "Warszawa")].into_iter().collect();
        assert_eq!(map.len(), 1);
        assert!(map.contains("title"));
    }

    #[test]
    fn test_group_uses_first_row_columns() {
        let group = ValueMapGroup::new(vec![
            row("Low", 1977),
            ValueMap::new().with("year", 1979).with("name", "Lodger"),
        ]);
        assert_eq!(group.column_string(), "(name, year)");
        assert_eq!(group.values_string(), "(?, ?), (?, ?)");
        assert_eq!(
            group.values(),
            vec![
                Value::from("Low"),
                Value::Integer(1977),
                Value::from("Lodger"),
                Value::Integer(1979),
            ]
        );
        assert!(group.check_columns().is_ok());
    }

    #[test]
    fn test_group_column_mismatch() {
        let group = ValueMapGroup::new(vec![
            row("Low", 1977),
            ValueMap::new().with("name", "Lodger"),
        ]);
        assert_eq!(
            group.check_columns(),
            Err(BuildError::MismatchedColumns { row: 1 })
        );
    }

    #[test]
    fn test_empty_group() {
        let group = ValueMapGroup::default();
        assert_eq!(group.values_string(), "");
        assert!(group.values().is_empty());
        assert!(Values::from(group).is_empty());
    }

    #[test]
    fn test_value_set_on_group_fails() {
        let values = Values::from(vec![row("Low", 1977), row("Heroes", 1977)]);
        assert!(matches!(
            values.value_set_string(),
            Err(Error::ValueSetOnGroup)
        ));

        let single = Values::from(row("Low", 1977));
        assert_eq!(single.value_set_string().unwrap(), "name = ?, year = ?");
    }
}
