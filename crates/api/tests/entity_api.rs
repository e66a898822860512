//! HTTP-level integration tests for the `/entities` endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, app_for_state, body_json, delete_auth, get, get_auth, post_auth,
    post_json_auth, put_json_auth, test_state,
};
use plug_core::transition::EVENT_RECORD_APPROVED;
use serde_json::json;
use sqlx::PgPool;

async fn create(pool: &PgPool, entity: &str, body: serde_json::Value) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &format!("/api/v1/entities/{entity}"), body, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Catalog and auth
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_catalog_lists_descriptors(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/entities", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["name"].as_str())
        .collect();
    assert!(names.contains(&"speakers"));
    assert!(names.contains(&"industries"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_entities_require_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/entities/speakers").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_garbage_token_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/entities/speakers", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_speaker_returns_201(pool: PgPool) {
    let created = create(
        &pool,
        "speakers",
        json!({"name": "Jane Doe", "company": "Acme", "topics": ["esg", "sourcing"]}),
    )
    .await;

    assert!(created["id"].is_number());
    assert_eq!(created["name"], "Jane Doe");
    assert_eq!(created["topics"], json!(["esg", "sourcing"]));
    assert!(created["deleted_at"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_speaker_by_id(pool: PgPool) {
    let created = create(&pool, "speakers", json!({"name": "Get Me"})).await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/entities/speakers/{id}"), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"], created);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_nonexistent_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/entities/speakers/999999", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_numeric_id_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/entities/speakers/abc", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_entity_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/entities/nonexistent_table", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNKNOWN_ENTITY");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lookup_table_is_not_an_entity(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/entities/industries", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_required_field_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/entities/speakers",
        json!({"company": "Acme"}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_object_body_returns_error_envelope(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/entities/speakers",
        json!(["Jane"]),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dangling_reference_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/entities/speakers",
        json!({"name": "Jane", "industry_id": 424242}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_speaker(pool: PgPool) {
    let created = create(&pool, "speakers", json!({"name": "Original"})).await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/entities/speakers/{id}"),
        json!({"name": "Updated", "bio": "Keynote regular"}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Updated");
    assert_eq!(json["data"]["bio"], "Keynote regular");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_nonexistent_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        "/api/v1/entities/speakers/999999",
        json!({"name": "Ghost"}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Delete, trash and restore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_is_idempotent(pool: PgPool) {
    let created = create(&pool, "speakers", json!({"name": "Delete Me"})).await;
    let uri = format!("/api/v1/entities/speakers/{}", created["id"]);

    let app = common::build_test_app(pool.clone());
    let first = delete_auth(app, &uri, &admin_token()).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await["data"]["deleted"], true);

    let app = common::build_test_app(pool.clone());
    let second = delete_auth(app, &uri, &admin_token()).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_json(second).await["data"]["deleted"], false);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &uri, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_speaker_moves_to_trash_and_restores(pool: PgPool) {
    let created = create(&pool, "speakers", json!({"name": "Trash Me"})).await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    delete_auth(app, &format!("/api/v1/entities/speakers/{id}"), &admin_token()).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/entities/speakers", &admin_token()).await;
    let listed = body_json(response).await;
    assert!(listed["data"].as_array().unwrap().is_empty());

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/entities/speakers/trash", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let trash = body_json(response).await;
    assert_eq!(trash["data"][0]["id"], id);
    assert!(trash["data"][0]["deleted_at"].is_string());

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, &format!("/api/v1/entities/speakers/{id}/restore"), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let restored = body_json(response).await;
    assert_eq!(restored["data"]["name"], "Trash Me");
    assert!(restored["data"]["deleted_at"].is_null());

    let app = common::build_test_app(pool);
    let response = post_auth(app, &format!("/api/v1/entities/speakers/{id}/restore"), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hard_delete_entity_has_no_trash(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/entities/talent_hiring/trash", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// List filters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_search_and_paging(pool: PgPool) {
    create(&pool, "speakers", json!({"name": "Alice Buyer"})).await;
    create(&pool, "speakers", json!({"name": "Bob Sourcing"})).await;
    create(&pool, "speakers", json!({"name": "Carol Buyer"})).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/entities/speakers?search=buyer", &admin_token()).await;
    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Carol Buyer", "Alice Buyer"]);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/entities/speakers?limit=1&offset=1", &admin_token()).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["name"], "Bob Sourcing");
}

// ---------------------------------------------------------------------------
// Approval events
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approval_flip_publishes_event(pool: PgPool) {
    let created = create(
        &pool,
        "consultants",
        json!({"name": "Dana Advisor", "email": "dana@example.com"}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let state = test_state(pool);
    let mut events = state.event_bus.subscribe();
    let app = app_for_state(state);

    let response = put_json_auth(
        app,
        &format!("/api/v1/entities/consultants/{id}"),
        json!({"is_approved": true}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let event = events.try_recv().expect("approval event should be published");
    assert_eq!(event.event_type, EVENT_RECORD_APPROVED);
    assert_eq!(event.entity.as_deref(), Some("consultants"));
    assert_eq!(event.entity_id, Some(id));
    assert_eq!(event.payload_str("email"), Some("dana@example.com"));
    assert!(events.try_recv().is_err(), "exactly one event per flip");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_without_flip_publishes_nothing(pool: PgPool) {
    let created = create(
        &pool,
        "consultants",
        json!({"name": "Eve Advisor", "is_approved": true}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let state = test_state(pool);
    let mut events = state.event_bus.subscribe();
    let app = app_for_state(state);

    put_json_auth(
        app,
        &format!("/api/v1/entities/consultants/{id}"),
        json!({"is_approved": true, "company": "Advisory Co"}),
        &admin_token(),
    )
    .await;

    assert!(events.try_recv().is_err());
}
