//! Filter expressions for row scans.
//!
//! The mapping layer treats filters as an opaque predicate language and
//! hands them to the store unchanged. The reference semantics live here as
//! [`RowFilter::apply`] so the in-memory store and any future remote client
//! agree on meaning: cell-level filters strip non-matching cells, and a row
//! is emitted only while at least one cell survives.

use crate::row::{Cell, Row};

/// An opaque predicate over a row and its cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    /// Matches everything; strips nothing.
    Pass,
    /// Exact row-key match: keeps all cells, or drops the row.
    Key(String),
    /// Keeps only cells in the given family.
    Family(String),
    /// Keeps only cells with the given qualifier.
    Qualifier(String),
    /// Keeps only cells whose encoded value matches exactly.
    Value(Vec<u8>),
    /// AND-composition: filters applied in sequence.
    Chain(Vec<RowFilter>),
    /// If `predicate` leaves at least one cell on the row, apply `then`;
    /// otherwise drop the row entirely.
    Condition {
        predicate: Box<RowFilter>,
        then: Box<RowFilter>,
    },
}

impl RowFilter {
    /// Exact-match filter on an encoded cell value.
    pub fn value_exact(bytes: impl Into<Vec<u8>>) -> Self {
        RowFilter::Value(bytes.into())
    }

    /// Conditional filter: rows where `predicate` holds pass through `then`.
    pub fn when(predicate: RowFilter, then: RowFilter) -> Self {
        RowFilter::Condition {
            predicate: Box::new(predicate),
            then: Box::new(then),
        }
    }

    /// Applies this filter to a row, returning the surviving cells.
    ///
    /// Returns `None` when no cell survives; such rows are not emitted by a
    /// scan.
    pub fn apply(&self, row: &Row) -> Option<Row> {
        let cells = self.filter_cells(&row.key, row.cells.clone());
        if cells.is_empty() {
            None
        } else {
            Some(Row::with_cells(row.key.clone(), cells))
        }
    }

    fn filter_cells(&self, key: &str, cells: Vec<Cell>) -> Vec<Cell> {
        match self {
            RowFilter::Pass => cells,
            RowFilter::Key(k) => {
                if key == k {
                    cells
                } else {
                    Vec::new()
                }
            }
            RowFilter::Family(f) => cells.into_iter().filter(|c| &c.family == f).collect(),
            RowFilter::Qualifier(q) => cells.into_iter().filter(|c| &c.qualifier == q).collect(),
            RowFilter::Value(v) => cells.into_iter().filter(|c| &c.value == v).collect(),
            RowFilter::Chain(filters) => filters
                .iter()
                .fold(cells, |cells, f| f.filter_cells(key, cells)),
            RowFilter::Condition { predicate, then } => {
                if predicate.filter_cells(key, cells.clone()).is_empty() {
                    Vec::new()
                } else {
                    then.filter_cells(key, cells)
                }
            }
        }
    }
}
