//! Entity metadata model.
//!
//! Each entity type is described by a statically-declared descriptor table:
//! its simple columns (qualifier + family + encode/decode hooks) and an
//! optional one-to-many child collection bound to its own family with an
//! indexed qualifier scheme. Descriptors are built once per type and live
//! for the program's lifetime; there is no runtime type introspection.
//!
//! Two columns colliding on the same `(family, qualifier)` pair is a caller
//! contract; the model does not validate it.

use uuid::Uuid;

use crate::error::Result;

/// Family used for simple attributes unless a column declares otherwise.
pub const DEFAULT_FAMILY: &str = "default";

/// Namespace prefix for child-collection families, so a collection can
/// share a short name with a simple-attribute family without colliding.
pub const ONE_TO_MANY_PREFIX: &str = "one-to-many-";

/// One simple attribute persisted as one cell.
pub struct ColumnDef<E> {
    pub family: &'static str,
    pub qualifier: &'static str,
    /// Encodes the field's current value to its cell payload.
    pub encode: fn(&E) -> Result<Vec<u8>>,
    /// Decodes a cell payload and assigns it to the field.
    pub decode: fn(&mut E, &[u8]) -> Result<()>,
}

/// An ordered child collection persisted as individually-numbered cells
/// (`qualifier_prefix + index`) within its own namespaced family.
pub struct OneToManyDef<E> {
    /// Short family name; stored under `ONE_TO_MANY_PREFIX + family`.
    pub family: &'static str,
    pub qualifier_prefix: &'static str,
    /// Encodes every element in order. Returns an empty list when the
    /// collection is absent or empty; neither is an error.
    pub encode_elements: fn(&E) -> Result<Vec<Vec<u8>>>,
    /// Decodes one element and appends it. The mapper calls this in
    /// ascending index order, so appends reproduce the written order, and
    /// never calls it for a row without collection cells — leaving the
    /// collection absent rather than empty.
    pub push_element: fn(&mut E, &[u8]) -> Result<()>,
}

/// Static description of how an entity type maps onto a table.
///
/// The `'static` bound lets descriptors hold borrowed column tables that
/// live for the program's lifetime.
pub struct EntityDescriptor<E: 'static> {
    /// Type name; doubles as the table id unless `table` overrides it.
    pub type_name: &'static str,
    pub table: Option<&'static str>,
    pub columns: &'static [ColumnDef<E>],
    pub one_to_many: Option<OneToManyDef<E>>,
}

impl<E: 'static> EntityDescriptor<E> {
    /// Backing table identifier.
    pub fn table_id(&self) -> &'static str {
        self.table.unwrap_or(self.type_name)
    }

    /// Namespaced family of the child collection, if one is declared.
    pub fn collection_family(&self) -> Option<String> {
        self.one_to_many
            .as_ref()
            .map(|c| format!("{}{}", ONE_TO_MANY_PREFIX, c.family))
    }

    /// Union of all simple-attribute families plus the collection family,
    /// deduplicated, in declaration order.
    pub fn families(&self) -> Vec<String> {
        let mut families: Vec<String> = Vec::new();
        for column in self.columns {
            if !families.iter().any(|f| f == column.family) {
                families.push(column.family.to_string());
            }
        }
        if let Some(collection) = self.collection_family() {
            if !families.contains(&collection) {
                families.push(collection);
            }
        }
        families
    }
}

/// A domain object persistable as one row.
///
/// `Default` provides the blank instance the mapper fills in when
/// re-materializing an entity from a scanned row.
pub trait Entity: Default + Send + Sync + 'static {
    /// The descriptor table for this type, derived once and cached for the
    /// program's lifetime.
    fn descriptor() -> &'static EntityDescriptor<Self>;

    /// Unique identifier; `None` until assigned by `Repository::create`.
    fn id(&self) -> Option<Uuid>;

    /// Assigns the identifier. Called once at creation and when reading a
    /// row back; the id is immutable from the caller's perspective.
    fn set_id(&mut self, id: Uuid);
}
