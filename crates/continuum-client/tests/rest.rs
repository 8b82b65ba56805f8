//! HTTP contract tests for `RestClient` against an in-process axum backend.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use continuum_client::{
    ApiResponse, Backend, ClientError, EntityKind, EntityStore, MutationDispatcher, RestClient,
};
use continuum_common::permissions::PermissionPolicy;
use serde_json::{Value, json};

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str) -> RestClient {
    RestClient::new(base, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn non_success_status_becomes_status_text_error() {
    let base = spawn(Router::new().route(
        "/api/updateLootHistory",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    ))
    .await;

    let err = client(&base)
        .post("/api/updateLootHistory", &json!({"row": {}}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "500: Internal Server Error");
}

#[tokio::test]
async fn no_content_is_empty_success() {
    let base = spawn(Router::new().route(
        "/api/deleteLootHistory",
        post(|| async { StatusCode::NO_CONTENT }),
    ))
    .await;

    let res = client(&base)
        .post("/api/deleteLootHistory", &json!({"id": 3}))
        .await
        .unwrap();
    assert_eq!(res, ApiResponse::Empty);
}

#[tokio::test]
async fn posts_are_sent_as_json() {
    let base = spawn(Router::new().route(
        "/api/updateItem",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_owned();
            Json(json!({"content_type": content_type, "echo": body}))
        }),
    ))
    .await;

    let res = client(&base)
        .post("/api/updateItem", &json!({"item": {"id": 1}}))
        .await
        .unwrap()
        .into_value();
    assert_eq!(res["content_type"], "application/json");
    assert_eq!(res["echo"], json!({"item": {"id": 1}}));
}

#[tokio::test]
async fn error_body_in_ok_response_is_business_error() {
    let base = spawn(Router::new().route(
        "/login",
        post(|| async { Json(json!({"error": "Unknown character"})) }),
    ))
    .await;

    let err = client(&base).post("/login", &json!({})).await.unwrap_err();
    assert!(matches!(err, ClientError::Business(ref m) if m == "Unknown character"));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let base = spawn(Router::new().route(
        "/api/getItems/",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!([]))
        }),
    ))
    .await;

    let rest = RestClient::new(&base, Duration::from_millis(100)).unwrap();
    let err = rest.get("/api/getItems/").await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout { .. }));
}

#[tokio::test]
async fn store_and_dispatcher_work_over_http() {
    let router = Router::new()
        .route(
            "/api/getLootHistory/",
            get(|| async {
                Json(json!([{"id": 1, "item_id": 100, "player_id": 1, "raid_day_id": 10}]))
            }),
        )
        .route(
            "/api/updateLootHistory",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
    let base = spawn(router).await;

    let rest = Arc::new(client(&base));
    let store = Arc::new(EntityStore::new(rest.clone()));
    store.refresh(EntityKind::LootHistory).await.unwrap();

    let dispatcher = MutationDispatcher::new(rest, store.clone(), PermissionPolicy::default());
    let mut row = store.loot_history().await[0];
    row.player_id = 2;
    assert!(dispatcher.update_loot_history(&row).await.is_err());
    assert_eq!(store.loot_history().await[0].player_id, 1);
}
