//! Generic CRUD over any registered content entity.
//!
//! Every operation resolves the caller's entity name through the
//! [`SchemaRegistry`] before any SQL is built, so an unknown name fails with
//! [`CoreError::UnknownEntity`] without touching the store.

use chrono::Utc;
use plug_core::error::CoreError;
use plug_core::fields::{decode_row, validate_insert, validate_update, FieldMap};
use plug_core::filter::ListFilter;
use plug_core::record::Record;
use plug_core::schema::{EntityDescriptor, SchemaRegistry};
use plug_core::transition::StatusTransition;
use plug_core::types::DbId;
use serde_json::Value;

use crate::error::{RepoResult, StoreResultExt};
use crate::sql;
use crate::store::RecordStore;

/// Result of [`EntityRepo::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub record: Record,
    /// Set when the update flipped the entity's approval column.
    pub transition: Option<StatusTransition>,
}

/// CRUD operations for content entities, borrowing a store and registry.
#[derive(Clone, Copy)]
pub struct EntityRepo<'a> {
    store: &'a dyn RecordStore,
    registry: &'a SchemaRegistry,
}

impl<'a> EntityRepo<'a> {
    pub fn new(store: &'a dyn RecordStore, registry: &'a SchemaRegistry) -> Self {
        Self { store, registry }
    }

    /// Live rows, newest first.
    pub async fn list(&self, entity: &str, filter: &ListFilter) -> RepoResult<Vec<Record>> {
        let d = self.registry.resolve_content(entity)?;
        self.list_rows(d, filter).await
    }

    /// A live row by id. Absent and soft-deleted rows are both `None`.
    pub async fn get(&self, entity: &str, id: DbId) -> RepoResult<Option<Record>> {
        let d = self.registry.resolve_content(entity)?;
        self.find_row(d, id, false).await
    }

    /// A row by id whether or not it has been soft-deleted.
    pub async fn find_including_deleted(
        &self,
        entity: &str,
        id: DbId,
    ) -> RepoResult<Option<Record>> {
        let d = self.soft_delete_descriptor(entity)?;
        self.find_row(d, id, true).await
    }

    /// Soft-deleted rows, most recently deleted first.
    pub async fn list_deleted(&self, entity: &str) -> RepoResult<Vec<Record>> {
        let d = self.soft_delete_descriptor(entity)?;
        let stmt = sql::list_deleted(self.registry, d)?;
        let rows = self.store.query(&stmt.sql, &stmt.params).await.for_entity(d.name)?;
        tracing::debug!(entity = d.name, count = rows.len(), "Listed deleted rows");
        Ok(rows.into_iter().map(|row| decode_row(d, row)).collect())
    }

    /// Insert a row and return it as stored.
    pub async fn add(&self, entity: &str, fields: &FieldMap) -> RepoResult<Record> {
        let d = self.registry.resolve_content(entity)?;
        self.insert_row(d, fields).await
    }

    /// Apply a partial field set to a live row.
    pub async fn update(&self, entity: &str, id: DbId, fields: &FieldMap) -> RepoResult<UpdateOutcome> {
        let d = self.registry.resolve_content(entity)?;
        self.update_row(d, id, fields).await
    }

    /// Remove a row per the entity's delete mode. Returns `false` when there
    /// was nothing to delete.
    pub async fn delete(&self, entity: &str, id: DbId) -> RepoResult<bool> {
        let d = self.registry.resolve_content(entity)?;
        self.delete_row(d, id).await
    }

    /// Clear `deleted_at` on a soft-deleted row. Returns `false` when the row
    /// is missing or not deleted.
    pub async fn restore(&self, entity: &str, id: DbId) -> RepoResult<bool> {
        let d = self.soft_delete_descriptor(entity)?;
        check_id(id)?;
        let stmt = sql::restore(d, id, Utc::now());
        let outcome = self.store.execute(&stmt.sql, &stmt.params).await.for_entity(d.name)?;
        let restored = outcome.affected_rows > 0;
        tracing::debug!(entity = d.name, id, restored, "Restore");
        Ok(restored)
    }

    fn soft_delete_descriptor(&self, entity: &str) -> RepoResult<&'a EntityDescriptor> {
        let d = self.registry.resolve_content(entity)?;
        if !d.has_soft_delete() {
            return Err(CoreError::Validation(format!(
                "{} rows are deleted permanently; there is no trash to read or restore",
                d.name
            ))
            .into());
        }
        Ok(d)
    }

    // -- descriptor-level operations, shared with the lookup repository --

    pub(crate) async fn list_rows(
        &self,
        d: &EntityDescriptor,
        filter: &ListFilter,
    ) -> RepoResult<Vec<Record>> {
        let stmt = sql::list(self.registry, d, filter)?;
        let rows = self.store.query(&stmt.sql, &stmt.params).await.for_entity(d.name)?;
        tracing::debug!(entity = d.name, count = rows.len(), "Listed rows");
        Ok(rows.into_iter().map(|row| decode_row(d, row)).collect())
    }

    pub(crate) async fn find_row(
        &self,
        d: &EntityDescriptor,
        id: DbId,
        include_deleted: bool,
    ) -> RepoResult<Option<Record>> {
        check_id(id)?;
        let stmt = sql::find(self.registry, d, id, include_deleted)?;
        let rows = self.store.query(&stmt.sql, &stmt.params).await.for_entity(d.name)?;
        Ok(rows.into_iter().next().map(|row| decode_row(d, row)))
    }

    pub(crate) async fn insert_row(
        &self,
        d: &EntityDescriptor,
        fields: &FieldMap,
    ) -> RepoResult<Record> {
        let assignments = validate_insert(d, fields)?;
        let stmt = sql::insert(d, &assignments, Utc::now());
        let outcome = self.store.execute(&stmt.sql, &stmt.params).await.for_entity(d.name)?;

        let id = outcome.insert_id.ok_or_else(|| {
            CoreError::Internal(format!("insert into {} returned no id", d.table_name))
        })?;
        tracing::debug!(entity = d.name, id, "Inserted row");

        self.find_row(d, id, false).await?.ok_or_else(|| {
            CoreError::Internal(format!("{} {id} vanished after insert", d.name)).into()
        })
    }

    pub(crate) async fn update_row(
        &self,
        d: &EntityDescriptor,
        id: DbId,
        fields: &FieldMap,
    ) -> RepoResult<UpdateOutcome> {
        check_id(id)?;
        let assignments = validate_update(d, fields)?;
        let not_found = || CoreError::NotFound { entity: d.name, id };

        // Writing the approval flag locks the row and reads its prior value in
        // the same statement, so concurrent flips serialize on the row lock.
        let approval = d
            .approval_column
            .filter(|column| assignments.iter().any(|(name, _)| name == column));
        let before = match approval {
            Some(column) => {
                let stmt = sql::update_returning_prior(d, id, &assignments, Utc::now(), column);
                let rows = self.store.query(&stmt.sql, &stmt.params).await.for_entity(d.name)?;
                let row = rows.into_iter().next().ok_or_else(not_found)?;
                Some(row.get("prior_value").and_then(Value::as_bool))
            }
            None => {
                let stmt = sql::update(d, id, &assignments, Utc::now());
                let outcome = self.store.execute(&stmt.sql, &stmt.params).await.for_entity(d.name)?;
                if outcome.affected_rows == 0 {
                    return Err(not_found().into());
                }
                None
            }
        };
        tracing::debug!(entity = d.name, id, fields = assignments.len(), "Updated row");

        let record = self.find_row(d, id, false).await?.ok_or_else(not_found)?;

        let transition = match (approval, before) {
            (Some(column), Some(before)) => StatusTransition::detect(
                d.name,
                id,
                column,
                before,
                record.get(column).and_then(Value::as_bool),
            ),
            _ => None,
        };

        Ok(UpdateOutcome { record, transition })
    }

    pub(crate) async fn delete_row(&self, d: &EntityDescriptor, id: DbId) -> RepoResult<bool> {
        check_id(id)?;
        let stmt = if d.has_soft_delete() {
            sql::soft_delete(d, id, Utc::now())
        } else {
            sql::hard_delete(d, id)
        };
        let outcome = self.store.execute(&stmt.sql, &stmt.params).await.for_entity(d.name)?;
        let deleted = outcome.affected_rows > 0;
        tracing::debug!(entity = d.name, id, deleted, soft = d.has_soft_delete(), "Delete");
        Ok(deleted)
    }
}

pub(crate) fn check_id(id: DbId) -> Result<(), CoreError> {
    if id > 0 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "id must be a positive integer, got {id}"
        )))
    }
}
