//! Handlers for the `/lookups` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use plug_core::error::CoreError;
use plug_core::fields::parse_record_id;
use plug_core::filter::ListFilter;
use plug_core::record::Record;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::handlers::entities::DeleteResult;
use crate::middleware::auth::AuthAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for adding or renaming a lookup entry.
#[derive(Debug, Deserialize)]
pub struct LookupInput {
    pub value: String,
}

/// GET /api/v1/lookups/{lookup}
pub async fn list(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(lookup): Path<String>,
    Query(filter): Query<ListFilter>,
) -> AppResult<Json<DataResponse<Vec<Record>>>> {
    let records = state.lookups().list(&lookup, &filter).await?;
    Ok(Json(DataResponse { data: records }))
}

/// POST /api/v1/lookups/{lookup}
pub async fn create(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(lookup): Path<String>,
    ApiJson(input): ApiJson<LookupInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Record>>)> {
    let record = state.lookups().add(&lookup, &input.value).await?;

    tracing::info!(
        lookup = %lookup,
        id = ?record.id(),
        admin = %admin.username,
        "Lookup value added"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// GET /api/v1/lookups/{lookup}/{id}
pub async fn get_by_id(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path((lookup, id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<Record>>> {
    let id = parse_record_id(&id)?;
    let name = state.registry.resolve_lookup(&lookup)?.name;
    let record = state
        .lookups()
        .get(name, id)
        .await?
        .ok_or(CoreError::NotFound { entity: name, id })?;
    Ok(Json(DataResponse { data: record }))
}

/// PUT /api/v1/lookups/{lookup}/{id}
pub async fn update(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path((lookup, id)): Path<(String, String)>,
    ApiJson(input): ApiJson<LookupInput>,
) -> AppResult<Json<DataResponse<Record>>> {
    let id = parse_record_id(&id)?;
    let record = state.lookups().update(&lookup, id, &input.value).await?;

    tracing::info!(lookup = %lookup, id, admin = %admin.username, "Lookup value renamed");

    Ok(Json(DataResponse { data: record }))
}

/// DELETE /api/v1/lookups/{lookup}/{id}
pub async fn delete(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path((lookup, id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<DeleteResult>>> {
    let id = parse_record_id(&id)?;
    let deleted = state.lookups().delete(&lookup, id).await?;

    tracing::info!(lookup = %lookup, id, deleted, admin = %admin.username, "Lookup value deleted");

    Ok(Json(DataResponse {
        data: DeleteResult { deleted },
    }))
}
