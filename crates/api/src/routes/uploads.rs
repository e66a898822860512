//! Route definitions for the `/uploads` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// Headroom for multipart boundaries and part headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Routes mounted at `/uploads`.
///
/// ```text
/// POST / -> upload
/// ```
///
/// The body limit is raised from axum's default to fit `max_bytes`; the
/// exact size check happens in the handler.
pub fn router(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(uploads::upload))
        .layer(DefaultBodyLimit::max(max_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)))
}
