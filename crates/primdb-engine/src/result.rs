//! Outcomes of engine operations.

use std::fmt;

use crate::catalog::{ColumnDef, TableSchema};

/// Description of a table returned by `info_table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// Columns, `ID` first.
    pub columns: Vec<ColumnDef>,
    /// Number of persisted rows.
    pub row_count: usize,
}

impl TableInfo {
    pub(crate) fn new(schema: &TableSchema, row_count: usize) -> Self {
        Self {
            name: schema.name().to_string(),
            columns: schema.columns().to_vec(),
            row_count,
        }
    }
}

/// Outcome of an update or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Rows matched and were changed; their IDs in scan order.
    Applied(Vec<i64>),
    /// Nothing matched; storage was not written.
    NoMatch,
}

impl Mutation {
    /// Returns the number of rows affected.
    pub fn affected(&self) -> usize {
        match self {
            Mutation::Applied(ids) => ids.len(),
            Mutation::NoMatch => 0,
        }
    }

    /// Returns the affected IDs.
    pub fn ids(&self) -> &[i64] {
        match self {
            Mutation::Applied(ids) => ids,
            Mutation::NoMatch => &[],
        }
    }

    /// Returns true if nothing matched.
    pub fn is_no_match(&self) -> bool {
        matches!(self, Mutation::NoMatch)
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Applied(ids) => write!(f, "{} row(s) affected", ids.len()),
            Mutation::NoMatch => f.write_str("no matching rows"),
        }
    }
}
