//! Batch ingestion
//!
//! Records missing `id` or `name` never reach the duplicate engine: they are
//! rejected here, together with batches that reuse an id.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{IngestError, IngestResult};
use crate::record::Record;

/// Parse a JSON array of business records
pub fn parse_batch(json: &str) -> IngestResult<Vec<Record>> {
    let value: Value = serde_json::from_str(json)?;
    parse_batch_value(value)
}

/// Parse an already-decoded JSON array of business records
pub fn parse_batch_value(value: Value) -> IngestResult<Vec<Record>> {
    let Value::Array(entries) = value else {
        return Err(IngestError::MalformedBatch(
            "expected a JSON array of records".to_string(),
        ));
    };

    let mut seen_ids = HashSet::with_capacity(entries.len());
    let mut records = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let record = parse_record(index, entry)?;
        if !seen_ids.insert(record.id) {
            return Err(IngestError::DuplicateId {
                id: record.id,
                index,
            });
        }
        records.push(record);
    }

    Ok(records)
}

/// Parse a single batch entry, checking the required fields first
pub fn parse_record(index: usize, entry: Value) -> IngestResult<Record> {
    let Some(object) = entry.as_object() else {
        return Err(IngestError::NotAnObject { index });
    };

    match object.get("id") {
        None | Some(Value::Null) => {
            return Err(IngestError::MissingField { index, field: "id" });
        }
        Some(id) if id.as_i64().is_none() => {
            return Err(IngestError::InvalidField {
                index,
                field: "id",
                message: format!("expected an integer, got {id}"),
            });
        }
        Some(_) => {}
    }

    match object.get("name") {
        None | Some(Value::Null) => {
            return Err(IngestError::MissingField {
                index,
                field: "name",
            });
        }
        Some(Value::String(name)) if name.trim().is_empty() => {
            return Err(IngestError::InvalidField {
                index,
                field: "name",
                message: "name must not be empty".to_string(),
            });
        }
        Some(Value::String(_)) => {}
        Some(other) => {
            return Err(IngestError::InvalidField {
                index,
                field: "name",
                message: format!("expected a string, got {other}"),
            });
        }
    }

    serde_json::from_value(entry).map_err(|err| IngestError::InvalidField {
        index,
        field: "record",
        message: err.to_string(),
    })
}
