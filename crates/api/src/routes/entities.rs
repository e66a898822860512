//! Route definitions for the `/entities` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::entities;
use crate::state::AppState;

/// Routes mounted at `/entities`.
///
/// ```text
/// GET    /                         -> catalog
/// GET    /{entity}                 -> list
/// POST   /{entity}                 -> create
/// GET    /{entity}/trash           -> list_deleted
/// GET    /{entity}/{id}            -> get_by_id
/// PUT    /{entity}/{id}            -> update
/// DELETE /{entity}/{id}            -> delete
/// POST   /{entity}/{id}/restore    -> restore
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(entities::catalog))
        .route("/{entity}", get(entities::list).post(entities::create))
        .route("/{entity}/trash", get(entities::list_deleted))
        .route(
            "/{entity}/{id}",
            get(entities::get_by_id)
                .put(entities::update)
                .delete(entities::delete),
        )
        .route("/{entity}/{id}/restore", post(entities::restore))
}
