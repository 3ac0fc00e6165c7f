use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAILED: &str = "failed";

/// A payment attempt and its gateway exchange.
///
/// Created `pending` when a payment is initiated; the reconciler fills in
/// `callback_payload` and resolves `status` when the asynchronous gateway
/// callback arrives. Records are never deleted by this service.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct PaymentTransaction {
    pub id: Uuid,
    pub status: String,
    pub description: Option<String>,
    pub request_payload: Option<serde_json::Value>,
    pub response_payload: Option<serde_json::Value>,
    pub callback_payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentTransaction {
    pub fn new(
        request_payload: Option<serde_json::Value>,
        response_payload: Option<serde_json::Value>,
        description: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: STATUS_PENDING.to_string(),
            description,
            request_payload,
            response_payload,
            callback_payload: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Audit-only record for a callback that matched no transaction.
    pub fn orphaned(callback_payload: serde_json::Value, status: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: status.to_string(),
            description: Some(description.to_string()),
            request_payload: None,
            response_payload: None,
            callback_payload: Some(callback_payload),
            created_at: now,
            updated_at: now,
        }
    }
}
