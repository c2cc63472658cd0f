//! Column value codec.
//!
//! Every attribute value, including each element of a one-to-many
//! collection, is serialized independently to a self-describing JSON
//! payload. JSON carries null/absent (`Option`), numeric wrappers, text,
//! decimals, and RFC 3339 timestamps with nanosecond precision, and stays
//! readable across versions and languages.
//!
//! Decoding a payload with a type other than the one that wrote it is a
//! caller error; the mapper reports it as a schema mismatch with full
//! column context.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

/// Encodes a value to its cell payload.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Decodes a cell payload back into a value.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}
