//! Handler for `POST /uploads`.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use plug_core::uploads::validate_upload;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Opaque reference to store in a record's text column.
    pub reference: String,
}

/// POST /api/v1/uploads
///
/// Accepts a multipart body with a single `file` field. Other fields are
/// ignored.
pub async fn upload(
    admin: AuthAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadResponse>>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("The file field has no file name".into()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

        validate_upload(&file_name, bytes.len(), state.config.uploads.max_bytes)?;
        let reference = state.uploads.store(&file_name, bytes.to_vec()).await?;

        tracing::info!(
            file_name = %file_name,
            size = bytes.len(),
            reference = %reference,
            admin = %admin.username,
            "File uploaded"
        );

        return Ok((
            StatusCode::CREATED,
            Json(DataResponse {
                data: UploadResponse { reference },
            }),
        ));
    }

    Err(AppError::BadRequest(format!(
        "Multipart body must contain a '{FILE_FIELD}' field"
    )))
}
