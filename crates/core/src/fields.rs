//! Validation and encoding of caller-supplied field sets.
//!
//! Handlers receive a JSON object per write. [`validate_insert`] and
//! [`validate_update`] check it against an [`EntityDescriptor`] and produce
//! typed [`ColumnValue`]s ready to be bound as positional parameters. JSON
//! columns are encoded to text here and decoded again by [`decode_row`].

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::record::Record;
use crate::schema::{ColumnDef, ColumnKind, EntityDescriptor, RESERVED_COLUMNS};
use crate::types::{DbId, Timestamp};

/// A caller-supplied JSON object of column name to value.
pub type FieldMap = Map<String, Value>;

/// A typed value bound to a positional SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// SQL `NULL` typed as the column it is written to.
    Null(ColumnKind),
    Text(String),
    Integer(i64),
    Boolean(bool),
    Timestamp(Timestamp),
}

/// One validated column assignment.
pub type Assignment = (&'static str, ColumnValue);

/// Validate a full field set for `add`.
///
/// Every non-nullable column must be present and non-null. Omitted nullable
/// columns are left to the table default.
pub fn validate_insert(
    descriptor: &EntityDescriptor,
    fields: &FieldMap,
) -> Result<Vec<Assignment>, CoreError> {
    check_known_fields(descriptor, fields)?;

    let mut assignments = Vec::with_capacity(fields.len());
    for column in descriptor.columns {
        match fields.get(column.name) {
            None | Some(Value::Null) if !column.nullable => {
                return Err(CoreError::Validation(format!(
                    "missing required field '{}'",
                    column.name
                )));
            }
            None => {}
            Some(value) => assignments.push((column.name, convert(column, value)?)),
        }
    }
    Ok(assignments)
}

/// Validate a partial field set for `update`. At least one field is required.
pub fn validate_update(
    descriptor: &EntityDescriptor,
    fields: &FieldMap,
) -> Result<Vec<Assignment>, CoreError> {
    if fields.is_empty() {
        return Err(CoreError::Validation("no fields to update".into()));
    }
    check_known_fields(descriptor, fields)?;

    descriptor
        .columns
        .iter()
        .filter_map(|column| {
            fields
                .get(column.name)
                .map(|value| convert(column, value).map(|v| (column.name, v)))
        })
        .collect()
}

/// Parse a path or body id. Ids are positive integers.
pub fn parse_record_id(raw: &str) -> Result<DbId, CoreError> {
    match raw.trim().parse::<DbId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CoreError::Validation(format!(
            "id must be a positive integer, got '{raw}'"
        ))),
    }
}

/// Decode JSON-encoded text columns of a raw row into structured values.
///
/// Text that does not parse as JSON is left as a string so legacy rows stay
/// readable.
pub fn decode_row(descriptor: &EntityDescriptor, mut row: Map<String, Value>) -> Record {
    for column in descriptor.columns.iter().filter(|c| c.json_encoded()) {
        let decoded = match row.get(column.name) {
            Some(Value::String(raw)) => serde_json::from_str::<Value>(raw).ok(),
            _ => None,
        };
        if let Some(decoded) = decoded {
            row.insert(column.name.to_string(), decoded);
        }
    }
    Record::from_map(row)
}

fn check_known_fields(descriptor: &EntityDescriptor, fields: &FieldMap) -> Result<(), CoreError> {
    for key in fields.keys() {
        if RESERVED_COLUMNS.contains(&key.as_str()) {
            return Err(CoreError::Validation(format!(
                "field '{key}' is managed by the server"
            )));
        }
        if descriptor.column(key).is_none() {
            return Err(CoreError::Validation(format!(
                "unknown field '{key}' for {}",
                descriptor.name
            )));
        }
    }
    Ok(())
}

fn convert(column: &ColumnDef, value: &Value) -> Result<ColumnValue, CoreError> {
    let invalid = |expected: &str| {
        CoreError::Validation(format!("field '{}' must be {expected}", column.name))
    };

    if value.is_null() {
        return if column.nullable {
            Ok(ColumnValue::Null(column.kind))
        } else {
            Err(invalid("non-null"))
        };
    }

    match column.kind {
        ColumnKind::Text => {
            let s = value.as_str().ok_or_else(|| invalid("a string"))?;
            if !column.nullable && s.trim().is_empty() {
                return Err(invalid("a non-empty string"));
            }
            Ok(ColumnValue::Text(s.to_string()))
        }
        ColumnKind::Integer => {
            let n = value.as_i64().ok_or_else(|| invalid("an integer"))?;
            if column.references.is_some() && n <= 0 {
                return Err(invalid("a positive id"));
            }
            Ok(ColumnValue::Integer(n))
        }
        ColumnKind::Boolean => value
            .as_bool()
            .map(ColumnValue::Boolean)
            .ok_or_else(|| invalid("a boolean")),
        ColumnKind::Json => match value {
            Value::Array(_) | Value::Object(_) => serde_json::to_string(value)
                .map(ColumnValue::Text)
                .map_err(|e| CoreError::Internal(format!("JSON encode failed: {e}"))),
            _ => Err(invalid("a JSON array or object")),
        },
        ColumnKind::Timestamp => value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ColumnValue::Timestamp(ts.with_timezone(&Utc)))
            .ok_or_else(|| invalid("an RFC 3339 timestamp")),
    }
}
