use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use plug_core::error::CoreError;
use plug_db::store::StoreError;
use plug_db::RepoError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`RepoError`] and adds HTTP-specific variants.
/// The only place errors become status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A repository error, carrying the entity the store failed on.
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

type Classified = (StatusCode, &'static str, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Repo(RepoError::Core(core)) => classify_core_error(core),
            AppError::Repo(RepoError::Storage { entity, source }) => {
                classify_store_error(entity, source)
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> Classified {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(core: &CoreError) -> Classified {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::UnknownEntity(name) => (
            StatusCode::NOT_FOUND,
            "UNKNOWN_ENTITY",
            format!("Unknown entity '{name}'"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Classify a store failure.
///
/// - Unique violations on `uq_` constraints map to 409.
/// - Foreign key violations (a reference to a missing lookup row) map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_store_error(entity: &str, err: &StoreError) -> Classified {
    if let sqlx::Error::Database(db_err) = err.sqlx_error() {
        match db_err.code().as_deref() {
            // PostgreSQL unique_violation
            Some("23505") => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            // PostgreSQL foreign_key_violation
            Some("23503") => {
                return (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("{entity} references a row that does not exist"),
                );
            }
            _ => {}
        }
    }

    match err {
        StoreError::Connection(e) => {
            tracing::error!(entity, error = %e, "Database connection unavailable");
        }
        StoreError::Statement(e) => {
            tracing::error!(entity, error = %e, "Database statement failed");
        }
    }
    internal()
}
