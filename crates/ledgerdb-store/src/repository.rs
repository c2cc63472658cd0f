//! Typed repository over one entity type.
//!
//! The public contract of the mapping layer: create, read-by-key (with or
//! without an extra filter), scan-by-filter, update, delete. Construction
//! validates the entity's descriptor and provisions the backing schema; a
//! repository whose schema could not be ensured is never handed out.
//!
//! The repository is stateless across calls and holds no entity cache;
//! correctness under concurrency rests on the store's single-row atomicity
//! and last-write-wins cell timestamps (see crate docs).

use std::marker::PhantomData;
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::client::StoreClient;
use crate::error::{Result, StoreError};
use crate::filter::RowFilter;
use crate::mapper;
use crate::metadata::{Entity, EntityDescriptor, DEFAULT_FAMILY};
use crate::provision;
use crate::row::Mutation;

/// Repository bound to one entity type and one backing table.
pub struct Repository<E: Entity> {
    client: Arc<dyn StoreClient>,
    table: &'static str,
    _entity: PhantomData<E>,
}

impl<E: Entity> Repository<E> {
    /// Builds a repository, validating the descriptor and ensuring the
    /// backing table and families exist. Provisioning failures are fatal
    /// here rather than deferred to the first operation.
    pub fn new(client: Arc<dyn StoreClient>) -> Result<Self> {
        let descriptor = E::descriptor();
        validate_descriptor(descriptor)?;
        provision::ensure_table(client.as_ref(), descriptor.table_id(), &descriptor.families())?;
        Ok(Self {
            client,
            table: descriptor.table_id(),
            _entity: PhantomData,
        })
    }

    /// Persists a new entity under a freshly generated identifier.
    ///
    /// Generation retries until an unused identifier is found. A v4 UUID
    /// collision is negligible, but the loop is a correctness guard: an
    /// identifier is never reused while a row for it still exists.
    pub fn create(&self, mut entity: E) -> Result<E> {
        loop {
            let id = Uuid::new_v4();
            if self.find_by_id(id)?.is_none() {
                entity.set_id(id);
                break;
            }
            debug!(
                "id {} already present in table '{}', regenerating",
                id, self.table
            );
        }
        self.update(entity)
    }

    /// Writes all attribute-derived cells as one atomic row mutation.
    ///
    /// The entity must already carry an identifier; store-level failures
    /// propagate to the caller unretried.
    pub fn update(&self, entity: E) -> Result<E> {
        let id = entity.id().ok_or_else(|| StoreError::InvalidKey {
            key: String::new(),
            reason: "entity carries no identifier; persist it with create() first".to_string(),
        })?;
        let mutations = mapper::to_mutations(&entity)?;
        self.client
            .mutate_row(self.table, &id.to_string(), mutations)?;
        Ok(entity)
    }

    /// Reads the entity's default-family attributes by key.
    ///
    /// Restricts the scan to `key == id` and the default family, so columns
    /// outside it (the child collection included) stay unloaded; use
    /// [`find_by_id_with_filter`](Self::find_by_id_with_filter) with
    /// [`RowFilter::Pass`] to fetch everything.
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<E>> {
        self.find_first(&RowFilter::Chain(vec![
            RowFilter::Key(id.to_string()),
            RowFilter::Family(DEFAULT_FAMILY.to_string()),
        ]))
    }

    /// Intersects the key match with a caller-supplied predicate in one
    /// read, so a present result already implies the predicate held.
    pub fn find_by_id_with_filter(&self, id: Uuid, filter: RowFilter) -> Result<Option<E>> {
        self.find_first(&RowFilter::when(RowFilter::Key(id.to_string()), filter))
    }

    /// Scans the whole table through the given filter and maps every
    /// matched row. Results come back in store-scan order; no ordering is
    /// guaranteed to callers.
    pub fn find_by_filter(&self, filter: &RowFilter) -> Result<Vec<E>> {
        self.client
            .read_rows(self.table, filter)?
            .map(|row| mapper::from_row(&row))
            .collect()
    }

    /// Removes the entire row. Deleting an absent key is not an error.
    pub fn delete_by_id(&self, id: Uuid) -> Result<()> {
        self.client
            .mutate_row(self.table, &id.to_string(), vec![Mutation::DeleteRow])
    }

    fn find_first(&self, filter: &RowFilter) -> Result<Option<E>> {
        self.client
            .read_rows(self.table, filter)?
            .next()
            .map(|row| mapper::from_row(&row))
            .transpose()
    }
}

fn validate_descriptor<E: 'static>(descriptor: &EntityDescriptor<E>) -> Result<()> {
    if descriptor.table_id().is_empty() {
        return Err(StoreError::Construction(
            "entity declares an empty table id".to_string(),
        ));
    }
    if descriptor.columns.is_empty() {
        return Err(StoreError::Construction(format!(
            "entity '{}' declares no columns",
            descriptor.type_name
        )));
    }
    // Key lookups (and the id-collision probe in create) read only the
    // default family; a type without a column there would make its own
    // rows invisible to them.
    if !descriptor.columns.iter().any(|c| c.family == DEFAULT_FAMILY) {
        return Err(StoreError::Construction(format!(
            "entity '{}' declares no default-family column",
            descriptor.type_name
        )));
    }
    for column in descriptor.columns {
        if column.family.is_empty() || column.qualifier.is_empty() {
            return Err(StoreError::Construction(format!(
                "entity '{}' declares a column with an empty family or qualifier",
                descriptor.type_name
            )));
        }
    }
    if let (Some(collection), Some(cf)) = (&descriptor.one_to_many, descriptor.collection_family())
    {
        if collection.family.is_empty() || collection.qualifier_prefix.is_empty() {
            return Err(StoreError::Construction(format!(
                "entity '{}' declares a collection with an empty family or qualifier prefix",
                descriptor.type_name
            )));
        }
        if descriptor.columns.iter().any(|c| c.family == cf) {
            return Err(StoreError::Construction(format!(
                "entity '{}': simple column family '{}' collides with the collection family",
                descriptor.type_name, cf
            )));
        }
    }
    Ok(())
}
