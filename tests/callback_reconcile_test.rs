mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use pesalingo_core::db::models::{PaymentTransaction, STATUS_PENDING, STATUS_SUCCESS};
use pesalingo_core::services::reconciler::ORPHAN_DESCRIPTION;
use pesalingo_core::store::memory::InMemoryTransactionStore;
use pesalingo_core::store::TransactionStore;
use pesalingo_core::translate::InMemoryTranslationCache;

fn post_callback(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/payments/callback")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_enveloped_callback_resolves_pending_transaction() {
    let store = InMemoryTransactionStore::new();
    let cache = InMemoryTranslationCache::new();
    let tx = PaymentTransaction::new(None, Some(json!({"CheckoutRequestID": "ws_1"})), None);
    store.insert(&tx).await.unwrap();

    let app = common::app(&store, &cache, "http://localhost:9");
    let stk_callback = json!({
        "MerchantRequestID": "29115-34620561-1",
        "CheckoutRequestID": "ws_1",
        "ResultCode": 0,
        "ResultDesc": "The service request is processed successfully."
    });
    let body = json!({"Body": {"stkCallback": stk_callback}});

    let response = app.oneshot(post_callback(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({"success": true}));

    let updated = store.get(tx.id).await.unwrap();
    assert_eq!(updated.status, STATUS_SUCCESS);
    // The recorded payload is the inner callback object, envelope stripped.
    assert_eq!(updated.callback_payload, Some(stk_callback));
}

#[tokio::test]
async fn test_flat_callback_with_mismatched_casing_still_matches() {
    let store = InMemoryTransactionStore::new();
    let cache = InMemoryTranslationCache::new();
    let tx = PaymentTransaction::new(
        Some(json!({"merchantRequestID": "mr_42"})),
        None,
        None,
    );
    store.insert(&tx).await.unwrap();

    let app = common::app(&store, &cache, "http://localhost:9");
    let body = json!({"MerchantRequestID": "mr_42", "ResultCode": "0"});

    let response = app.oneshot(post_callback(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.get(tx.id).await.unwrap().status, STATUS_SUCCESS);
}

#[tokio::test]
async fn test_unmatched_callback_is_persisted_as_orphan() {
    let store = InMemoryTransactionStore::new();
    let cache = InMemoryTranslationCache::new();
    let existing = PaymentTransaction::new(None, Some(json!({"CheckoutRequestID": "ws_other"})), None);
    store.insert(&existing).await.unwrap();

    let app = common::app(&store, &cache, "http://localhost:9");
    let body = json!({
        "Body": {"stkCallback": {"CheckoutRequestID": "ws_unknown", "ResultCode": 1037}}
    });

    let response = app.oneshot(post_callback(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Exactly one new audit record; the existing one is untouched.
    assert_eq!(store.len().await, 2);
    assert_eq!(store.get(existing.id).await.unwrap().status, STATUS_PENDING);
    assert!(store.get(existing.id).await.unwrap().callback_payload.is_none());

    let rows = store.list_recent(10, 0).await.unwrap();
    let orphan = rows.iter().find(|tx| tx.id != existing.id).unwrap();
    assert_eq!(orphan.status, "failed");
    assert_eq!(orphan.description.as_deref(), Some(ORPHAN_DESCRIPTION));
    assert!(orphan.callback_payload.is_some());
}

#[tokio::test]
async fn test_malformed_callback_body_is_rejected() {
    let store = InMemoryTransactionStore::new();
    let cache = InMemoryTranslationCache::new();
    let app = common::app(&store, &cache, "http://localhost:9");

    let response = app
        .oneshot(post_callback("{not valid json".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("callback payload"));
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_preflight_is_answered_with_cors_headers() {
    let store = InMemoryTransactionStore::new();
    let cache = InMemoryTranslationCache::new();
    let app = common::app(&store, &cache, "http://localhost:9");

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/payments/callback")
                .header("origin", "https://example.com")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_create_then_fetch_transaction() {
    let store = InMemoryTransactionStore::new();
    let cache = InMemoryTranslationCache::new();
    let app = common::app(&store, &cache, "http://localhost:9");

    let create = Request::builder()
        .method("POST")
        .uri("/payments/transactions")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "request_payload": {"Amount": 1500, "PhoneNumber": "254712345678"},
                "response_payload": {"CheckoutRequestID": "ws_55", "ResponseCode": "0"}
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(create).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    assert_eq!(created["status"], STATUS_PENDING);

    let id = created["id"].as_str().unwrap();
    let fetch = Request::builder()
        .uri(format!("/payments/transactions/{id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(fetch).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = response_json(response).await;
    assert_eq!(fetched["response_payload"]["CheckoutRequestID"], "ws_55");
}

#[tokio::test]
async fn test_unknown_transaction_returns_404() {
    let store = InMemoryTransactionStore::new();
    let cache = InMemoryTranslationCache::new();
    let app = common::app(&store, &cache, "http://localhost:9");

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/payments/transactions/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
