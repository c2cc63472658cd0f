//! Store client abstraction.
//!
//! The wide-column store is an external service; this trait is the whole
//! boundary the mapping layer consumes. Implementations must be thread-safe
//! (`Send + Sync`) so one client can back many repositories.
//!
//! ## Architecture
//!
//! ```text
//! Repository<E>          ← typed CRUD over one entity type (repository.rs)
//!     ↓
//! StoreClient            ← wide-column operations (this file)
//!     ↓
//! MemoryStore / remote   ← actual store implementation
//! ```
//!
//! The mapping layer performs no retries and imposes no timeouts here;
//! cancellation is the caller's concern at the transport boundary.

use crate::error::Result;
use crate::filter::RowFilter;
use crate::row::{Mutation, Row};

/// Streamed scan result. Boxed so backends can materialize or stream as
/// they see fit.
pub type RowStream = Box<dyn Iterator<Item = Row> + Send>;

/// Operations the mapping layer needs from a wide-column store.
pub trait StoreClient: Send + Sync {
    /// Checks whether a table exists.
    fn table_exists(&self, table: &str) -> Result<bool>;

    /// Creates a table with exactly the given column families.
    ///
    /// Idempotent: creating a table that already exists is not an error and
    /// leaves the existing schema untouched.
    fn create_table(&self, table: &str, families: &[String]) -> Result<()>;

    /// Scans the table, delegating the filter expression to the store, and
    /// returns matched rows in store-scan order.
    ///
    /// Rows where the filter leaves no cell are not emitted.
    fn read_rows(&self, table: &str, filter: &RowFilter) -> Result<RowStream>;

    /// Applies all mutations to one row atomically.
    ///
    /// The store assigns write timestamps; every `SetCell` in one call
    /// shares the same timestamp. `Mutation::DeleteRow` removes the row and
    /// is idempotent.
    fn mutate_row(&self, table: &str, key: &str, mutations: Vec<Mutation>) -> Result<()>;
}
