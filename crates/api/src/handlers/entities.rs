//! Handlers for the `/entities` resource.
//!
//! One set of handlers serves every content entity; the `{entity}` path
//! segment is resolved through the schema registry by the repository.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use plug_core::error::CoreError;
use plug_core::fields::{parse_record_id, FieldMap};
use plug_core::filter::ListFilter;
use plug_core::record::Record;
use plug_core::schema::EntityDescriptor;
use plug_events::PlatformEvent;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::middleware::auth::AuthAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of a delete response.
#[derive(Debug, Serialize)]
pub struct DeleteResult {
    /// `false` when the row was already gone.
    pub deleted: bool,
}

/// GET /api/v1/entities
///
/// Every registered descriptor, content entities and lookup tables alike,
/// so the dashboard can build its forms.
pub async fn catalog(
    _admin: AuthAdmin,
    State(state): State<AppState>,
) -> Json<DataResponse<Vec<EntityDescriptor>>> {
    let descriptors = state.registry.descriptors().cloned().collect();
    Json(DataResponse { data: descriptors })
}

/// GET /api/v1/entities/{entity}
pub async fn list(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(filter): Query<ListFilter>,
) -> AppResult<Json<DataResponse<Vec<Record>>>> {
    let records = state.entities().list(&entity, &filter).await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /api/v1/entities/{entity}/trash
pub async fn list_deleted(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> AppResult<Json<DataResponse<Vec<Record>>>> {
    let records = state.entities().list_deleted(&entity).await?;
    Ok(Json(DataResponse { data: records }))
}

/// POST /api/v1/entities/{entity}
pub async fn create(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(entity): Path<String>,
    ApiJson(fields): ApiJson<FieldMap>,
) -> AppResult<(StatusCode, Json<DataResponse<Record>>)> {
    let record = state.entities().add(&entity, &fields).await?;

    tracing::info!(
        entity = %entity,
        id = ?record.id(),
        admin = %admin.username,
        "Record created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// GET /api/v1/entities/{entity}/{id}
pub async fn get_by_id(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<Record>>> {
    let id = parse_record_id(&id)?;
    let name = state.registry.resolve_content(&entity)?.name;
    let record = state
        .entities()
        .get(name, id)
        .await?
        .ok_or(CoreError::NotFound { entity: name, id })?;
    Ok(Json(DataResponse { data: record }))
}

/// PUT /api/v1/entities/{entity}/{id}
///
/// Publishes `record.approved` / `record.unapproved` when the update flips
/// the entity's approval flag.
pub async fn update(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    ApiJson(fields): ApiJson<FieldMap>,
) -> AppResult<Json<DataResponse<Record>>> {
    let id = parse_record_id(&id)?;
    let outcome = state.entities().update(&entity, id, &fields).await?;

    tracing::info!(
        entity = %entity,
        id,
        fields = fields.len(),
        admin = %admin.username,
        "Record updated"
    );

    if let Some(transition) = &outcome.transition {
        tracing::info!(
            entity = %entity,
            id,
            event_type = transition.event_type(),
            "Approval status changed"
        );
        state
            .event_bus
            .publish(PlatformEvent::from_transition(transition, &outcome.record));
    }

    Ok(Json(DataResponse {
        data: outcome.record,
    }))
}

/// DELETE /api/v1/entities/{entity}/{id}
///
/// Idempotent: deleting an already-deleted row answers 200 with
/// `deleted: false`.
pub async fn delete(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<DeleteResult>>> {
    let id = parse_record_id(&id)?;
    let deleted = state.entities().delete(&entity, id).await?;

    tracing::info!(
        entity = %entity,
        id,
        deleted,
        admin = %admin.username,
        "Record deleted"
    );

    Ok(Json(DataResponse {
        data: DeleteResult { deleted },
    }))
}

/// POST /api/v1/entities/{entity}/{id}/restore
pub async fn restore(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<Record>>> {
    let id = parse_record_id(&id)?;
    let name = state.registry.resolve_content(&entity)?.name;
    let repo = state.entities();

    if !repo.restore(name, id).await? {
        return Err(CoreError::NotFound { entity: name, id }.into());
    }
    let record = repo
        .get(name, id)
        .await?
        .ok_or(CoreError::NotFound { entity: name, id })?;

    tracing::info!(entity = name, id, admin = %admin.username, "Record restored");

    Ok(Json(DataResponse { data: record }))
}
