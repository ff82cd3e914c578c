//! Rows read back from SQLite

use crate::Result;
use indexmap::IndexMap;
use serde::de::value::{MapDeserializer, SeqDeserializer, StringDeserializer};
use serde::de::{self, DeserializeOwned, Deserializer as _, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column as _, Row as _};
use squeeb_core::Value;

/// One result row: column names mapped to values, in select order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a driver row, probing each column's storage class in turn
    pub(crate) fn from_sqlite(row: &SqliteRow) -> Self {
        let mut values = IndexMap::with_capacity(row.columns().len());

        for column in row.columns() {
            let index = column.ordinal();
            let value = if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
                v.map(Value::Integer).unwrap_or(Value::Null)
            } else if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
                v.map(Value::Real).unwrap_or(Value::Null)
            } else if let Ok(v) = row.try_get::<Option<String>, _>(index) {
                v.map(Value::Text).unwrap_or(Value::Null)
            } else if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
                v.map(Value::Blob).unwrap_or(Value::Null)
            } else {
                Value::Null
            };
            values.insert(column.name().to_string(), value);
        }

        Self { values }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Integer value of `column`, if it holds one
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.values.get(column) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(column, value)| (column.clone(), value.to_json()))
                .collect(),
        )
    }

    pub fn into_json(self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .into_iter()
                .map(|(column, value)| (column, value.to_json()))
                .collect(),
        )
    }

    /// Deserialize the row into `T`, matching fields by column name.
    ///
    /// Each field's type decides how its stored value is read, so `bool`
    /// fields accept `0`/`1` and `Vec<u8>` fields accept BLOBs.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        deserialize_fields(self.values.clone())
    }
}

/// Deserialize `T` from `(field, value)` pairs.
///
/// SQLite keeps fewer storage classes than serde has types, so a value is
/// read according to what the field asks for: integers for `bool`, BLOBs for
/// byte sequences, and TEXT holding JSON for collections, maps and structs.
pub(crate) fn deserialize_fields<T, I>(fields: I) -> Result<T>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = (String, Value)>,
{
    let map = MapDeserializer::<_, serde_json::Error>::new(
        fields
            .into_iter()
            .map(|(field, value)| (field, ValueDeserializer(value))),
    );
    Ok(T::deserialize(map)?)
}

struct ValueDeserializer(Value);

impl<'de> IntoDeserializer<'de, serde_json::Error> for ValueDeserializer {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

type DeResult<T> = std::result::Result<T, serde_json::Error>;

fn parse_json(text: &str) -> DeResult<serde_json::Value> {
    serde_json::from_str(text)
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        match self.0 {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Integer(i) => visitor.visit_i64(i),
            Value::Real(f) => visitor.visit_f64(f),
            Value::Text(s) => visitor.visit_string(s),
            Value::Blob(b) => visitor.visit_byte_buf(b),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        match self.0 {
            Value::Integer(i) => visitor.visit_bool(i != 0),
            other => ValueDeserializer(other).deserialize_any(visitor),
        }
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        match self.0 {
            Value::Text(s) => visitor.visit_byte_buf(s.into_bytes()),
            other => ValueDeserializer(other).deserialize_any(visitor),
        }
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        match self.0 {
            Value::Blob(bytes) => {
                let mut seq = SeqDeserializer::<_, serde_json::Error>::new(bytes.into_iter());
                let value = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(value)
            }
            Value::Text(text) => parse_json(&text)?.deserialize_seq(visitor),
            other => ValueDeserializer(other).deserialize_any(visitor),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> DeResult<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> DeResult<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        match self.0 {
            Value::Text(text) => parse_json(&text)?.deserialize_map(visitor),
            other => ValueDeserializer(other).deserialize_any(visitor),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> DeResult<V::Value> {
        match self.0 {
            Value::Text(text) => parse_json(&text)?.deserialize_struct(name, fields, visitor),
            other => ValueDeserializer(other).deserialize_any(visitor),
        }
    }

    // Unit variants are stored as their name, the rest as JSON objects
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> DeResult<V::Value> {
        match self.0 {
            Value::Text(text) if text.trim_start().starts_with('{') => {
                parse_json(&text)?.deserialize_enum(name, variants, visitor)
            }
            Value::Text(text) => {
                let variant: StringDeserializer<serde_json::Error> = text.into_deserializer();
                visitor.visit_enum(variant)
            }
            other => ValueDeserializer(other).deserialize_any(visitor),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DeResult<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 char str string
        unit unit_struct identifier ignored_any
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
