//! Request extractors with the API's error envelope.

use axum::extract::FromRequest;

use crate::error::AppError;

/// [`axum::Json`] whose rejections answer with the `{error, code}` body.
///
/// Malformed JSON, a non-object body where a map is expected, or a missing
/// content type all become `400 BAD_REQUEST`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
