//! Query utilities for the MrP API
//!
//! Endpoint paths and helpers for listing and decoding records.

use crate::error::MrpError;
use crate::mrp_trait::Transport;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const IMAGE_PATH: &str = "/api/v1/image";
pub const IMAGE_LISTING_PATH: &str = "/api/v1/image?show_all=true";
pub const PRESEED_PATH: &str = "/api/v1/preseed";
pub const PRESEED_LISTING_PATH: &str = "/api/v1/preseed?show_all=true";

/// Machine listing filtered on an exact name, hidden records excluded
pub fn machine_by_name_path(name: &str) -> String {
    format!(
        "/api/v1/machine?q=(= name \"{}\")&show_all=false",
        urlencoding::encode(name)
    )
}

pub fn machine_path(machine_id: u64) -> String {
    format!("/api/v1/machine/{}", machine_id)
}

pub fn machine_interfaces_path(machine_id: u64) -> String {
    format!("/api/v1/machine/{}/interface", machine_id)
}

pub fn machine_state_path(machine_id: u64) -> String {
    format!("/api/v1/machine/{}/state", machine_id)
}

pub fn preseed_path(preseed_id: u64) -> String {
    format!("{}/{}", PRESEED_PATH, preseed_id)
}

/// Decode a JSON answer into a typed record
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, MrpError> {
    serde_json::from_value(value).map_err(MrpError::Serialization)
}

/// GET a listing endpoint and decode every element
pub async fn query_records<T: DeserializeOwned>(
    transport: &dyn Transport,
    path: &str,
) -> Result<Vec<T>, MrpError> {
    let value = transport.get(path).await?;
    decode(value)
}

/// A listing field as text; numbers are compared by their decimal form
pub fn field_text<'a>(record: &'a Value, key: &str) -> Option<std::borrow::Cow<'a, str>> {
    match record.get(key)? {
        Value::String(text) => Some(text.as_str().into()),
        Value::Number(number) => Some(number.to_string().into()),
        _ => None,
    }
}

/// GET a listing and decode the first element accepted by `select`
///
/// Only the selected element is decoded, so malformed siblings do not fail
/// the lookup.
pub async fn find_record<T: DeserializeOwned>(
    transport: &dyn Transport,
    path: &str,
    select: impl Fn(&Value) -> bool,
) -> Result<Option<T>, MrpError> {
    let records: Vec<Value> = query_records(transport, path).await?;
    records
        .into_iter()
        .find(|record| select(record))
        .map(decode)
        .transpose()
}
