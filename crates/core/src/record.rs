//! Generic record shape returned by the entity repositories.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::DbId;

/// A row as a JSON object: column name to decoded value.
///
/// Always carries `id`, `created_at` and `updated_at`; soft-delete entities
/// also carry `deleted_at`. Reference columns are accompanied by their
/// resolved `<base>_name` display field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn id(&self) -> Option<DbId> {
        self.0.get("id").and_then(Value::as_i64)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// `true` when the row carries a non-null `deleted_at`.
    pub fn is_deleted(&self) -> bool {
        matches!(self.0.get("deleted_at"), Some(v) if !v.is_null())
    }
}
