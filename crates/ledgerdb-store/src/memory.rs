//! In-memory wide-column store.
//!
//! Implements [`StoreClient`] with the same observable semantics the mapping
//! layer expects from the real backend: multi-version cells, store-assigned
//! monotonic write timestamps, atomic row mutations, and filter evaluation
//! on the store side. Used by tests and as a local emulator.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use parking_lot::RwLock;

use crate::client::{RowStream, StoreClient};
use crate::config::StoreSettings;
use crate::error::{Result, StoreError};
use crate::filter::RowFilter;
use crate::row::{Cell, Mutation, Row};

struct Table {
    families: Vec<String>,
    /// BTreeMap gives a stable scan order (by key).
    rows: BTreeMap<String, Vec<Cell>>,
}

/// Thread-safe in-memory store keyed by table id.
pub struct MemoryStore {
    instance: String,
    tables: RwLock<HashMap<String, Table>>,
    /// Last issued write timestamp, in microseconds since the epoch.
    clock: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_instance("local")
    }

    /// Creates a store bound to the instance named in the settings.
    pub fn from_settings(settings: &StoreSettings) -> Self {
        info!(
            "opening in-memory store for project '{}', instance '{}'",
            settings.project_id, settings.instance_id
        );
        Self::with_instance(settings.instance_id.clone())
    }

    fn with_instance(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            tables: RwLock::new(HashMap::new()),
            clock: AtomicI64::new(0),
        }
    }

    /// Instance name this store was opened under.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Issues a strictly increasing timestamp so writes from different
    /// `mutate_row` calls can never tie.
    fn next_timestamp(&self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or(0);
        self.clock
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .map(|last| now.max(last + 1))
            .unwrap_or(now)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreClient for MemoryStore {
    fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(self.tables.read().contains_key(table))
    }

    fn create_table(&self, table: &str, families: &[String]) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(table) {
            debug!("table '{}' already exists on '{}'", table, self.instance);
            return Ok(());
        }
        tables.insert(
            table.to_string(),
            Table {
                families: families.to_vec(),
                rows: BTreeMap::new(),
            },
        );
        info!(
            "created table '{}' with families {:?} on '{}'",
            table, families, self.instance
        );
        Ok(())
    }

    fn read_rows(&self, table: &str, filter: &RowFilter) -> Result<RowStream> {
        let tables = self.tables.read();
        let table = tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let matched: Vec<Row> = table
            .rows
            .iter()
            .filter_map(|(key, cells)| filter.apply(&Row::with_cells(key.clone(), cells.clone())))
            .collect();
        Ok(Box::new(matched.into_iter()))
    }

    fn mutate_row(&self, table_id: &str, key: &str, mutations: Vec<Mutation>) -> Result<()> {
        let timestamp = self.next_timestamp();
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(table_id)
            .ok_or_else(|| StoreError::TableNotFound(table_id.to_string()))?;

        // Validate up front so the batch stays all-or-nothing.
        for mutation in &mutations {
            if let Mutation::SetCell { family, .. } = mutation {
                if !table.families.contains(family) {
                    return Err(StoreError::Unavailable(format!(
                        "table '{}' has no column family '{}'",
                        table_id, family
                    )));
                }
            }
        }

        let mut cells = table.rows.remove(key).unwrap_or_default();
        for mutation in mutations {
            match mutation {
                Mutation::SetCell {
                    family,
                    qualifier,
                    value,
                } => cells.push(Cell {
                    family,
                    qualifier,
                    value,
                    timestamp_micros: timestamp,
                }),
                Mutation::DeleteRow => cells.clear(),
            }
        }
        if !cells.is_empty() {
            table.rows.insert(key.to_string(), cells);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(family: &str, qualifier: &str, value: &[u8]) -> Mutation {
        Mutation::SetCell {
            family: family.into(),
            qualifier: qualifier.into(),
            value: value.to_vec(),
        }
    }

    fn store_with_table() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_table("accounts", &["default".to_string()])
            .unwrap();
        store
    }

    #[test]
    fn test_create_table_is_idempotent() {
        let store = store_with_table();
        store
            .create_table("accounts", &["default".to_string()])
            .unwrap();
        assert!(store.table_exists("accounts").unwrap());
    }

    #[test]
    fn test_write_then_read_back() {
        let store = store_with_table();
        store
            .mutate_row("accounts", "k1", vec![set("default", "email", b"\"a\"")])
            .unwrap();

        let rows: Vec<Row> = store
            .read_rows("accounts", &RowFilter::Pass)
            .unwrap()
            .collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "k1");
        assert_eq!(rows[0].cells[0].value, b"\"a\"");
    }

    #[test]
    fn test_rewrites_accumulate_versions_with_increasing_timestamps() {
        let store = store_with_table();
        store
            .mutate_row("accounts", "k1", vec![set("default", "email", b"\"a\"")])
            .unwrap();
        store
            .mutate_row("accounts", "k1", vec![set("default", "email", b"\"b\"")])
            .unwrap();

        let rows: Vec<Row> = store
            .read_rows("accounts", &RowFilter::Pass)
            .unwrap()
            .collect();
        assert_eq!(rows[0].cells.len(), 2);
        assert!(rows[0].cells[0].timestamp_micros < rows[0].cells[1].timestamp_micros);
    }

    #[test]
    fn test_delete_row_is_idempotent() {
        let store = store_with_table();
        store
            .mutate_row("accounts", "k1", vec![set("default", "email", b"\"a\"")])
            .unwrap();
        store
            .mutate_row("accounts", "k1", vec![Mutation::DeleteRow])
            .unwrap();
        store
            .mutate_row("accounts", "k1", vec![Mutation::DeleteRow])
            .unwrap();

        let rows: Vec<Row> = store
            .read_rows("accounts", &RowFilter::Pass)
            .unwrap()
            .collect();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_unknown_family_is_rejected() {
        let store = store_with_table();
        let err = store
            .mutate_row("accounts", "k1", vec![set("nope", "q", b"1")])
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_missing_table_errors() {
        let store = MemoryStore::new();
        let err = store.read_rows("missing", &RowFilter::Pass).err().unwrap();
        assert!(matches!(err, StoreError::TableNotFound(_)));
    }
}
