//! Per-table repositories.
//!
//! Each function issues one store query and translates between the
//! form/record structs and the row shape. Column mapping is exhaustive in
//! both directions; a record that round-trips through a repository comes
//! back field-for-field equal.

pub mod assessment;
pub mod doctor;
pub mod patient;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::IntakeError;

/// Decode a stored row into its record struct.
pub(crate) fn decode<T: DeserializeOwned>(table: &str, row: Value) -> Result<T, IntakeError> {
    serde_json::from_value(row)
        .map_err(|e| IntakeError::store(&format!("decoding {table} row"), e.to_string()))
}
