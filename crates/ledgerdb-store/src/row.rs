//! Wide-column row model.
//!
//! A row is a string key plus an unordered bag of cells grouped into
//! families and addressed by qualifier. A column (family + qualifier pair)
//! may carry multiple cells with different write timestamps ("versions");
//! resolving versions is the reader's concern (see `mapper`).

/// One versioned value of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Column family name.
    pub family: String,
    /// Column name within the family.
    pub qualifier: String,
    /// Opaque encoded value (see `codec`).
    pub value: Vec<u8>,
    /// Store-assigned write timestamp in microseconds since the epoch.
    pub timestamp_micros: i64,
}

/// The store's native unit: a key plus the cells read for that key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub key: String,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            cells: Vec::new(),
        }
    }

    pub fn with_cells(key: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            key: key.into(),
            cells,
        }
    }
}

/// A single operation inside an atomic row mutation.
///
/// All mutations passed to one `StoreClient::mutate_row` call are applied as
/// a single row-level batch: a partial column write within one call is never
/// observable as separately-timestamped versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Write one cell; the store assigns the write timestamp.
    SetCell {
        family: String,
        qualifier: String,
        value: Vec<u8>,
    },
    /// Remove the entire row, all families included.
    DeleteRow,
}
