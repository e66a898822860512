#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use plug_api::auth::jwt::{generate_access_token, JwtConfig};
use plug_api::auth::password::hash_password;
use plug_api::config::{AdminCredential, ServerConfig, UploadConfig};
use plug_api::router::build_app_router;
use plug_api::state::AppState;
use plug_api::uploads::LocalUploadStore;
use plug_core::schema::SchemaRegistry;
use plug_db::store::PgRecordStore;
use plug_db::DatabaseConfig;
use plug_events::EventBus;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "plug-test-password";

/// Upload ceiling used by the test config.
pub const TEST_UPLOAD_MAX_BYTES: usize = 1024;

/// Argon2 is slow on purpose; hash the test password once per binary.
fn admin_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(ADMIN_PASSWORD).expect("hashing should succeed"))
        .clone()
}

/// Build a test `ServerConfig` with safe defaults and a throwaway upload dir.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        },
        admin: AdminCredential {
            username: ADMIN_USERNAME.to_string(),
            password_hash: admin_password_hash(),
        },
        jwt: JwtConfig {
            secret: "plug-test-secret".to_string(),
            expiry_mins: 15,
        },
        uploads: UploadConfig {
            dir: upload_dir(),
            max_bytes: TEST_UPLOAD_MAX_BYTES,
        },
    }
}

fn upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("plug-api-test-{}", uuid::Uuid::new_v4()))
}

/// Application state over the given pool, with the builtin catalog.
pub fn test_state(pool: PgPool) -> AppState {
    let config = test_config();
    AppState {
        pool: pool.clone(),
        store: Arc::new(PgRecordStore::new(pool)),
        registry: Arc::new(SchemaRegistry::builtin()),
        uploads: Arc::new(LocalUploadStore::new(config.uploads.dir.clone())),
        config: Arc::new(config),
        event_bus: Arc::new(EventBus::default()),
    }
}

/// Build the full application router with all middleware layers, exactly as
/// the binary does.
pub fn build_test_app(pool: PgPool) -> Router {
    app_for_state(test_state(pool))
}

pub fn app_for_state(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    build_app_router(state, &config).expect("test config is valid")
}

/// A valid admin bearer token signed with the test secret.
pub fn admin_token() -> String {
    generate_access_token(ADMIN_USERNAME, &test_config().jwt).expect("token should encode")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    request(method, uri, token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, request(Method::GET, uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::GET, uri, Some(token)).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token)).body(Body::empty()).unwrap()).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::DELETE, uri, Some(token)).body(Body::empty()).unwrap()).await
}

/// POST a multipart body with a single file part.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    field: &str,
    file_name: &str,
    bytes: &[u8],
    token: &str,
) -> Response {
    let boundary = "plug-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = request(Method::POST, uri, Some(token))
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}
