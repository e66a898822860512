//! JWT-based admin extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use plug_core::error::CoreError;

use crate::auth::jwt::{validate_token, ADMIN_ROLE};
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated dashboard admin, extracted from a Bearer token.
///
/// Add it as a handler parameter to require authentication:
///
/// ```ignore
/// async fn my_handler(admin: AuthAdmin) -> AppResult<Json<()>> {
///     tracing::info!(admin = %admin.username, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub username: String,
    /// Token id, for correlating audit log lines.
    pub token_id: String,
}

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing Authorization header".into()))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        if claims.role != ADMIN_ROLE {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Token does not grant admin access".into(),
            )));
        }

        Ok(AuthAdmin {
            username: claims.sub,
            token_id: claims.jti,
        })
    }
}
