//! Equality filters and set clauses.

use std::fmt;

use indexmap::IndexMap;

use primdb_common::{PrimError, PrimResult, Row, Value};

use crate::catalog::TableSchema;

/// Column assignments of an update, applied in order.
pub type SetClause = IndexMap<String, Value>;

/// A single `column = value` predicate.
///
/// Displays in canonical form, `column=<json value>`, which is also what
/// read fingerprints are built from. Text values are quoted, so `n=1` and
/// `n="1"` never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    /// Column to compare.
    pub column: String,
    /// Value the column must equal.
    pub value: Value,
}

impl Predicate {
    /// Creates a new predicate.
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Returns true if the row's column equals the predicate value.
    ///
    /// Equality is tag-aware: `Integer(1)` never equals `Text("1")`.
    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column) == Some(&self.value)
    }

    /// Checks the predicate against a schema.
    pub fn check(&self, schema: &TableSchema) -> PrimResult<()> {
        let expected = schema.column_type(&self.column)?;
        let actual = self.value.data_type();
        if expected != actual {
            return Err(PrimError::TypeMismatch {
                table: schema.name().to_string(),
                column: self.column.clone(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.column, self.value)
    }
}

/// Returns true if `filter` is absent or matches the row.
pub(crate) fn selects(filter: Option<&Predicate>, row: &Row) -> bool {
    filter.map_or(true, |p| p.matches(row))
}
