use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::models::PaymentTransaction;
use crate::domain::GatewayCallback;
use crate::error::AppError;
use crate::store::{StoreError, TransactionStore};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub request_payload: Option<serde_json::Value>,
    pub response_payload: Option<serde_json::Value>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Records a payment attempt initiated against the gateway. The record starts
/// `pending` and waits for the asynchronous callback.
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tx = PaymentTransaction::new(
        payload.request_payload,
        payload.response_payload,
        payload.description,
    );
    let inserted = state.store.insert(&tx).await?;

    Ok((StatusCode::CREATED, Json(inserted)))
}

/// Asynchronous gateway callback endpoint.
///
/// The body is parsed by hand: the gateway's payload is not self-describing
/// and an unparseable body is the only terminal failure (500). Everything
/// else, including a store that is down, is acknowledged with 200; the
/// gateway retries non-2xx responses, and a duplicate callback storm is
/// worse than a lost best-effort update.
pub async fn callback(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let raw: serde_json::Value = serde_json::from_str(&body)
        .map_err(|e| AppError::Internal(format!("unparseable callback payload: {e}")))?;

    let callback = GatewayCallback::normalize(raw);
    if let Err(e) = state.reconciler.reconcile(&callback).await {
        tracing::error!(error = %e, "callback reconciliation failed, acknowledging anyway");
    }

    Ok(Json(json!({"success": true})))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tx = state.store.get(id).await.map_err(|e| match e {
        StoreError::NotFound(id) => AppError::NotFound(format!("Transaction {id} not found")),
        other => AppError::Store(other),
    })?;

    Ok(Json(tx))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let limit = pagination.limit.unwrap_or(20);
    let offset = pagination.offset.unwrap_or(0);

    let transactions = state.store.list_recent(limit, offset).await?;

    Ok(Json(transactions))
}
