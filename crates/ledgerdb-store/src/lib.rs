//! # ledgerdb-store
//!
//! Generic entity-to-wide-column mapping layer. Derives a table schema
//! (table id, column families, qualifiers) from a statically-declared
//! entity descriptor, serializes entity fields into column cells and back,
//! resolves multiple cell versions per column by last-write-wins, maps a
//! one-to-many child collection onto indexed columns in a dedicated family,
//! and executes filter-based row scans.
//!
//! ## Architecture
//!
//! ```text
//! Repository<E>              ← typed CRUD, unique key assignment
//!     ↓ mapper + codec       ← entity ⇄ cells translation
//! StoreClient                ← wide-column operations (opaque filters)
//!     ↓
//! MemoryStore / remote store ← actual storage service
//! ```
//!
//! ## Concurrency model
//!
//! The layer is stateless across calls except for once-per-construction
//! schema provisioning. Each operation is a single round trip relying on
//! the store's single-row atomicity; concurrent writers to the same row
//! race and the greatest cell timestamp wins. There is no application-level
//! coordination across rows and no compare-and-set.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod mapper;
pub mod memory;
pub mod metadata;
pub mod provision;
pub mod repository;
pub mod row;

pub use client::{RowStream, StoreClient};
pub use config::StoreSettings;
pub use error::{Result, StoreError};
pub use filter::RowFilter;
pub use memory::MemoryStore;
pub use metadata::{
    ColumnDef, Entity, EntityDescriptor, OneToManyDef, DEFAULT_FAMILY, ONE_TO_MANY_PREFIX,
};
pub use repository::Repository;
pub use row::{Cell, Mutation, Row};
