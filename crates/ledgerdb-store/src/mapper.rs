//! Row mapper: translates between typed entities and untyped rows.
//!
//! Write direction emits one `SetCell` per simple attribute and one per
//! collection element (`prefix + index`, gap-free). Read direction folds the
//! row's cell versions down to the newest per column (last-write-wins),
//! decodes each survivor through its descriptor, and reassembles the child
//! collection by the numeric suffix encoded in the qualifier. A cell whose
//! column matches no descriptor is reported as a schema mismatch, never
//! silently dropped.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::metadata::Entity;
use crate::row::{Cell, Mutation, Row};

/// Converts an entity into the mutations of one atomic row write.
///
/// An absent or empty child collection yields no cells; this collapse is
/// intentional, so "written empty" reads back as absent.
pub fn to_mutations<E: Entity>(entity: &E) -> Result<Vec<Mutation>> {
    let descriptor = E::descriptor();
    let mut mutations = Vec::with_capacity(descriptor.columns.len());
    for column in descriptor.columns {
        mutations.push(Mutation::SetCell {
            family: column.family.to_string(),
            qualifier: column.qualifier.to_string(),
            value: (column.encode)(entity)?,
        });
    }
    if let Some(collection) = &descriptor.one_to_many {
        let family = format!("{}{}", crate::metadata::ONE_TO_MANY_PREFIX, collection.family);
        for (index, value) in (collection.encode_elements)(entity)?.into_iter().enumerate() {
            mutations.push(Mutation::SetCell {
                family: family.clone(),
                qualifier: format!("{}{}", collection.qualifier_prefix, index),
                value,
            });
        }
    }
    Ok(mutations)
}

/// Reconstructs an entity from one scanned row.
pub fn from_row<E: Entity>(row: &Row) -> Result<E> {
    let descriptor = E::descriptor();
    let id = Uuid::parse_str(&row.key).map_err(|e| StoreError::InvalidKey {
        key: row.key.clone(),
        reason: e.to_string(),
    })?;
    let mut entity = E::default();
    entity.set_id(id);

    // Plain fold keeping only the newest version per column.
    let mut latest: HashMap<(&str, &str), &Cell> = HashMap::new();
    for cell in &row.cells {
        let slot = latest
            .entry((cell.family.as_str(), cell.qualifier.as_str()))
            .or_insert(cell);
        if cell.timestamp_micros > slot.timestamp_micros {
            *slot = cell;
        }
    }

    let collection_family = descriptor.collection_family();
    // Collection elements may arrive in any order; the numeric suffix in the
    // qualifier decides their position.
    let mut elements: BTreeMap<usize, &Cell> = BTreeMap::new();

    for ((family, qualifier), cell) in latest {
        if let (Some(collection), Some(cf)) = (&descriptor.one_to_many, &collection_family) {
            if family == cf {
                let index = qualifier
                    .strip_prefix(collection.qualifier_prefix)
                    .and_then(|suffix| suffix.parse::<usize>().ok())
                    .ok_or_else(|| {
                        schema_mismatch(
                            descriptor.table_id(),
                            row,
                            family,
                            qualifier,
                            "collection qualifier carries no numeric index",
                        )
                    })?;
                elements.insert(index, cell);
                continue;
            }
        }
        let column = descriptor
            .columns
            .iter()
            .find(|c| c.family == family && c.qualifier == qualifier)
            .ok_or_else(|| {
                schema_mismatch(
                    descriptor.table_id(),
                    row,
                    family,
                    qualifier,
                    "no column definition for this cell",
                )
            })?;
        (column.decode)(&mut entity, &cell.value).map_err(|e| {
            schema_mismatch(descriptor.table_id(), row, family, qualifier, &e.to_string())
        })?;
    }

    if let Some(collection) = &descriptor.one_to_many {
        for (_, cell) in elements {
            (collection.push_element)(&mut entity, &cell.value).map_err(|e| {
                schema_mismatch(
                    descriptor.table_id(),
                    row,
                    &cell.family,
                    &cell.qualifier,
                    &e.to_string(),
                )
            })?;
        }
    }
    Ok(entity)
}

fn schema_mismatch(
    table: &str,
    row: &Row,
    family: &str,
    qualifier: &str,
    detail: &str,
) -> StoreError {
    StoreError::SchemaMismatch {
        table: table.to_string(),
        row_key: row.key.clone(),
        family: family.to_string(),
        qualifier: qualifier.to_string(),
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::metadata::{ColumnDef, EntityDescriptor, OneToManyDef, DEFAULT_FAMILY};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Note {
        id: Option<Uuid>,
        title: String,
        pinned: Option<bool>,
        labels: Option<Vec<String>>,
    }

    impl Entity for Note {
        fn descriptor() -> &'static EntityDescriptor<Self> {
            static DESCRIPTOR: EntityDescriptor<Note> = EntityDescriptor {
                type_name: "Note",
                table: None,
                columns: &[
                    ColumnDef {
                        family: DEFAULT_FAMILY,
                        qualifier: "title",
                        encode: |n| codec::encode(&n.title),
                        decode: |n, bytes| {
                            n.title = codec::decode(bytes)?;
                            Ok(())
                        },
                    },
                    ColumnDef {
                        family: DEFAULT_FAMILY,
                        qualifier: "pinned",
                        encode: |n| codec::encode(&n.pinned),
                        decode: |n, bytes| {
                            n.pinned = codec::decode(bytes)?;
                            Ok(())
                        },
                    },
                ],
                one_to_many: Some(OneToManyDef {
                    family: "label",
                    qualifier_prefix: "label-",
                    encode_elements: |n| {
                        n.labels.iter().flatten().map(|l| codec::encode(l)).collect()
                    },
                    push_element: |n, bytes| {
                        n.labels
                            .get_or_insert_with(Vec::new)
                            .push(codec::decode(bytes)?);
                        Ok(())
                    },
                }),
            };
            &DESCRIPTOR
        }

        fn id(&self) -> Option<Uuid> {
            self.id
        }

        fn set_id(&mut self, id: Uuid) {
            self.id = Some(id);
        }
    }

    fn as_row(key: Uuid, mutations: Vec<Mutation>, timestamp: i64) -> Row {
        let cells = mutations
            .into_iter()
            .map(|m| match m {
                Mutation::SetCell {
                    family,
                    qualifier,
                    value,
                } => Cell {
                    family,
                    qualifier,
                    value,
                    timestamp_micros: timestamp,
                },
                Mutation::DeleteRow => panic!("unexpected delete in write set"),
            })
            .collect();
        Row::with_cells(key.to_string(), cells)
    }

    #[test]
    fn test_round_trip_preserves_attributes_and_collection_order() {
        let note = Note {
            id: Some(Uuid::new_v4()),
            title: "groceries".into(),
            pinned: Some(true),
            labels: Some(vec!["home".into(), "urgent".into()]),
        };
        let row = as_row(note.id.unwrap(), to_mutations(&note).unwrap(), 10);
        let read: Note = from_row(&row).unwrap();
        assert_eq!(read, note);
    }

    #[test]
    fn test_last_write_wins_regardless_of_cell_order() {
        let id = Uuid::new_v4();
        let row = Row::with_cells(
            id.to_string(),
            vec![
                Cell {
                    family: DEFAULT_FAMILY.into(),
                    qualifier: "title".into(),
                    value: codec::encode("newer").unwrap(),
                    timestamp_micros: 20,
                },
                Cell {
                    family: DEFAULT_FAMILY.into(),
                    qualifier: "title".into(),
                    value: codec::encode("older").unwrap(),
                    timestamp_micros: 10,
                },
                Cell {
                    family: DEFAULT_FAMILY.into(),
                    qualifier: "pinned".into(),
                    value: codec::encode(&Some(false)).unwrap(),
                    timestamp_micros: 10,
                },
            ],
        );
        let read: Note = from_row(&row).unwrap();
        assert_eq!(read.title, "newer");
    }

    #[test]
    fn test_collection_reassembles_by_numeric_suffix() {
        let id = Uuid::new_v4();
        // Cells arrive out of index order.
        let row = Row::with_cells(
            id.to_string(),
            vec![
                Cell {
                    family: "one-to-many-label".into(),
                    qualifier: "label-1".into(),
                    value: codec::encode("second").unwrap(),
                    timestamp_micros: 5,
                },
                Cell {
                    family: DEFAULT_FAMILY.into(),
                    qualifier: "title".into(),
                    value: codec::encode("t").unwrap(),
                    timestamp_micros: 5,
                },
                Cell {
                    family: DEFAULT_FAMILY.into(),
                    qualifier: "pinned".into(),
                    value: codec::encode(&None::<bool>).unwrap(),
                    timestamp_micros: 5,
                },
                Cell {
                    family: "one-to-many-label".into(),
                    qualifier: "label-0".into(),
                    value: codec::encode("first").unwrap(),
                    timestamp_micros: 5,
                },
            ],
        );
        let read: Note = from_row(&row).unwrap();
        assert_eq!(
            read.labels,
            Some(vec!["first".to_string(), "second".to_string()])
        );
    }

    #[test]
    fn test_empty_collection_emits_no_cells_and_reads_back_absent() {
        let written = Note {
            id: Some(Uuid::new_v4()),
            title: "t".into(),
            pinned: None,
            labels: Some(Vec::new()),
        };
        let mutations = to_mutations(&written).unwrap();
        assert_eq!(mutations.len(), 2); // title + pinned only

        let read: Note = from_row(&as_row(written.id.unwrap(), mutations, 1)).unwrap();
        assert_eq!(read.labels, None);
    }

    #[test]
    fn test_unknown_column_is_a_schema_mismatch() {
        let id = Uuid::new_v4();
        let row = Row::with_cells(
            id.to_string(),
            vec![Cell {
                family: DEFAULT_FAMILY.into(),
                qualifier: "ghost".into(),
                value: codec::encode("x").unwrap(),
                timestamp_micros: 1,
            }],
        );
        let err = from_row::<Note>(&row).unwrap_err();
        assert!(matches!(err, StoreError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_decode_type_mismatch_is_a_schema_mismatch() {
        let id = Uuid::new_v4();
        let row = Row::with_cells(
            id.to_string(),
            vec![Cell {
                family: DEFAULT_FAMILY.into(),
                qualifier: "pinned".into(),
                value: codec::encode("not-a-bool").unwrap(),
                timestamp_micros: 1,
            }],
        );
        let err = from_row::<Note>(&row).unwrap_err();
        assert!(matches!(err, StoreError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_malformed_row_key_is_invalid() {
        let row = Row::new("not-a-uuid");
        let err = from_row::<Note>(&row).unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey { .. }));
    }
}
