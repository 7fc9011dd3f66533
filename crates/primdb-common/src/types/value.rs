//! Column types and runtime values.
//!
//! Every value carries its own tag, so validating a value against a column
//! is a direct comparison between `Value::data_type` and the declared
//! `DataType`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declared type of a column.
///
/// The serialized names (`int`, `str`, `bool`) are the names used in the
/// metadata file and in `name:type` column specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit signed integer.
    #[serde(rename = "int")]
    Integer,
    /// UTF-8 string.
    #[serde(rename = "str")]
    String,
    /// Boolean.
    #[serde(rename = "bool")]
    Boolean,
}

impl DataType {
    /// All supported types, in declaration order.
    pub const ALL: [DataType; 3] = [DataType::Integer, DataType::String, DataType::Boolean];

    /// Returns the name used on disk and in column specs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DataType::Integer => "int",
            DataType::String => "str",
            DataType::Boolean => "bool",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A type name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown data type '{0}' (supported: int, str, bool)")]
pub struct UnknownTypeName(pub String);

impl FromStr for DataType {
    type Err = UnknownTypeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        DataType::ALL
            .into_iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownTypeName(s.to_string()))
    }
}

/// A single typed value stored in a row.
///
/// Serialized as the bare JSON scalar, so a row file reads as plain JSON
/// objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer value.
    Integer(i64),
    /// Text value.
    Text(String),
    /// Boolean value.
    Boolean(bool),
}

impl Value {
    /// Creates a text value.
    pub fn text(v: impl Into<String>) -> Self {
        Value::Text(v.into())
    }

    /// Returns the tag of this value.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Text(_) => DataType::String,
            Value::Boolean(_) => DataType::Boolean,
        }
    }

    /// Returns the inner integer, if this is an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the inner string slice, if this is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the inner boolean, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns true if this value conforms to the given column type.
    #[must_use]
    pub fn conforms_to(&self, ty: DataType) -> bool {
        self.data_type() == ty
    }
}

/// Renders the value as its JSON literal (strings quoted and escaped).
///
/// This form is unambiguous across types: `1`, `"1"` and `true` never
/// collide.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Text(s) => match serde_json::to_string(s) {
                Ok(quoted) => f.write_str(&quoted),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
