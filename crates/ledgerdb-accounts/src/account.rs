//! The account entity and its movement history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ledgerdb_store::{codec, ColumnDef, Entity, EntityDescriptor, OneToManyDef, DEFAULT_FAMILY};

/// Qualifier of the owner-email column, exposed so collaborators can build
/// ownership filters against it.
pub const OWNER_EMAIL_QUALIFIER: &str = "owner-email";

/// Short family name of the movement collection (stored namespaced).
pub const MOVEMENT_FAMILY: &str = "movement";

/// One booking on an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub amount: Decimal,
    pub description: String,
    pub time: DateTime<Utc>,
}

/// A monetary account owned by one user.
///
/// `movements` is `None` when the collection was never loaded or never
/// written; callers must treat that as "unknown", not "zero bookings".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    id: Option<Uuid>,
    pub owner_email: String,
    pub balance: Option<Decimal>,
    pub description: String,
    pub movements: Option<Vec<Movement>>,
}

impl Account {
    pub fn new(owner_email: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            owner_email: owner_email.into(),
            balance: None,
            description: description.into(),
            movements: None,
        }
    }
}

impl Entity for Account {
    fn descriptor() -> &'static EntityDescriptor<Self> {
        static DESCRIPTOR: EntityDescriptor<Account> = EntityDescriptor {
            type_name: "Account",
            table: Some("accounts"),
            columns: &[
                ColumnDef {
                    family: DEFAULT_FAMILY,
                    qualifier: OWNER_EMAIL_QUALIFIER,
                    encode: |a| codec::encode(&a.owner_email),
                    decode: |a, bytes| {
                        a.owner_email = codec::decode(bytes)?;
                        Ok(())
                    },
                },
                ColumnDef {
                    family: DEFAULT_FAMILY,
                    qualifier: "balance",
                    encode: |a| codec::encode(&a.balance),
                    decode: |a, bytes| {
                        a.balance = codec::decode(bytes)?;
                        Ok(())
                    },
                },
                ColumnDef {
                    family: DEFAULT_FAMILY,
                    qualifier: "description",
                    encode: |a| codec::encode(&a.description),
                    decode: |a, bytes| {
                        a.description = codec::decode(bytes)?;
                        Ok(())
                    },
                },
            ],
            one_to_many: Some(OneToManyDef {
                family: MOVEMENT_FAMILY,
                qualifier_prefix: "movement-",
                encode_elements: |a| {
                    a.movements
                        .iter()
                        .flatten()
                        .map(|m| codec::encode(m))
                        .collect()
                },
                push_element: |a, bytes| {
                    a.movements
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
