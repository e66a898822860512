pub mod auth;
pub mod entities;
pub mod health;
pub mod lookups;
pub mod uploads;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth
///     /login                     login (public)
///
/// /entities                      descriptor catalog
///     /{entity}                  list, add
///     /{entity}/trash            soft-deleted rows
///     /{entity}/{id}             get, update, delete
///     /{entity}/{id}/restore     restore
///
/// /lookups
///     /{lookup}                  list, add
///     /{lookup}/{id}             get, rename, delete
///
/// /uploads                       multipart upload
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/entities", entities::router())
        .nest("/lookups", lookups::router())
        .nest("/uploads", uploads::router(config.uploads.max_bytes))
}
