//! Route definitions for the `/lookups` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::lookups;
use crate::state::AppState;

/// Routes mounted at `/lookups`.
///
/// ```text
/// GET    /{lookup}         -> list
/// POST   /{lookup}         -> create
/// GET    /{lookup}/{id}    -> get_by_id
/// PUT    /{lookup}/{id}    -> update
/// DELETE /{lookup}/{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{lookup}", get(lookups::list).post(lookups::create))
        .route(
            "/{lookup}/{id}",
            get(lookups::get_by_id)
                .put(lookups::update)
                .delete(lookups::delete),
        )
}
