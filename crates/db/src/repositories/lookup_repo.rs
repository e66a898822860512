//! Repository for single-value lookup tables (industries, locations, ...).

use plug_core::error::CoreError;
use plug_core::fields::FieldMap;
use plug_core::filter::ListFilter;
use plug_core::lookup::{normalize_lookup_value, LOOKUP_VALUE_COLUMN};
use plug_core::record::Record;
use plug_core::schema::{EntityDescriptor, SchemaRegistry};
use plug_core::types::DbId;
use serde_json::Value;

use super::entity_repo::check_id;
use super::EntityRepo;
use crate::error::{RepoResult, StoreResultExt};
use crate::sql;
use crate::store::RecordStore;

/// CRUD over lookup tables. Values are trimmed and unique among live rows,
/// compared case-insensitively.
#[derive(Clone, Copy)]
pub struct LookupRepo<'a> {
    store: &'a dyn RecordStore,
    registry: &'a SchemaRegistry,
    entities: EntityRepo<'a>,
}

impl<'a> LookupRepo<'a> {
    pub fn new(store: &'a dyn RecordStore, registry: &'a SchemaRegistry) -> Self {
        Self {
            store,
            registry,
            entities: EntityRepo::new(store, registry),
        }
    }

    /// Live values, newest first.
    pub async fn list(&self, lookup: &str, filter: &ListFilter) -> RepoResult<Vec<Record>> {
        let d = self.registry.resolve_lookup(lookup)?;
        self.entities.list_rows(d, filter).await
    }

    pub async fn get(&self, lookup: &str, id: DbId) -> RepoResult<Option<Record>> {
        let d = self.registry.resolve_lookup(lookup)?;
        self.entities.find_row(d, id, false).await
    }

    pub async fn add(&self, lookup: &str, value: &str) -> RepoResult<Record> {
        let d = self.registry.resolve_lookup(lookup)?;
        let value = normalize_lookup_value(value)?;
        self.ensure_unique(d, &value, None).await?;

        let record = self.entities.insert_row(d, &value_fields(value)).await?;
        tracing::debug!(lookup = d.name, id = ?record.id(), "Added lookup value");
        Ok(record)
    }

    pub async fn update(&self, lookup: &str, id: DbId, value: &str) -> RepoResult<Record> {
        let d = self.registry.resolve_lookup(lookup)?;
        check_id(id)?;
        let value = normalize_lookup_value(value)?;
        self.ensure_unique(d, &value, Some(id)).await?;

        let outcome = self.entities.update_row(d, id, &value_fields(value)).await?;
        Ok(outcome.record)
    }

    /// Soft-delete a value. Content rows referencing it keep their id and
    /// still resolve its display name.
    pub async fn delete(&self, lookup: &str, id: DbId) -> RepoResult<bool> {
        let d = self.registry.resolve_lookup(lookup)?;
        self.entities.delete_row(d, id).await
    }

    async fn ensure_unique(
        &self,
        d: &EntityDescriptor,
        value: &str,
        exclude_id: Option<DbId>,
    ) -> RepoResult<()> {
        let stmt = sql::find_lookup_value(d, value, exclude_id);
        let rows = self.store.query(&stmt.sql, &stmt.params).await.for_entity(d.name)?;
        if rows.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!("{} already contains '{value}'", d.name)).into())
        }
    }
}

fn value_fields(value: String) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert(LOOKUP_VALUE_COLUMN.to_string(), Value::String(value));
    fields
}
