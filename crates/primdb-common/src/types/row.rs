//! Rows keyed by column name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::value::Value;
use crate::constants::ID_COLUMN;

/// A single row of data with named columns.
///
/// Column order is preserved exactly as inserted (the identity column first,
/// then the schema's columns), which keeps re-encoded data files stable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    columns: IndexMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a row holding only the identity column.
    pub fn with_id(id: i64) -> Self {
        let mut row = Self::new();
        row.insert(ID_COLUMN, Value::Integer(id));
        row
    }

    /// Returns the identity of this row, if it has an integer `ID`.
    pub fn id(&self) -> Option<i64> {
        self.get(ID_COLUMN).and_then(Value::as_integer)
    }

    /// Gets the value of a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Sets a column, keeping its position if it already exists.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) -> Option<Value> {
        self.columns.insert(column.into(), value)
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over column names in column order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id() {
        let row = Row::with_id(5);
        assert_eq!(row.id(), Some(5));
        assert_eq!(Row::new().id(), None);

        let row: Row = [(ID_COLUMN, Value::text("5"))].into_iter().collect();
        assert_eq!(row.id(), None);
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut row = Row::with_id(1);
        row.insert("name", Value::text("Ann"));
        row.insert("age", Value::Integer(30));
        row.insert("name", Value::text("Bob"));

        let names: Vec<&str> = row.column_names().collect();
        assert_eq!(names, vec!["ID", "name", "age"]);
        assert_eq!(row.get("name"), Some(&Value::text("Bob")));
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_json_preserves_order() {
        let mut row = Row::with_id(2);
        row.insert("zeta", Value::Boolean(true));
        row.insert("alpha", Value::text("a"));

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"ID":2,"zeta":true,"alpha":"a"}"#);

        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
        assert_eq!(serde_json::to_string(&back).unwrap(), json);
    }
}
