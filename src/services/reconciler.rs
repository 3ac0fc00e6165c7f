//! Payment callback reconciliation.
//!
//! Gateway callbacks carry weak correlation identifiers and no pointer to the
//! transaction they belong to. The reconciler scans a bounded window of
//! recent transactions, newest first, and attaches the callback to the first
//! record whose stored gateway payloads mention either identifier. Unmatched
//! callbacks are kept as audit records instead of being dropped.

use std::sync::Arc;
use uuid::Uuid;

use crate::db::models::{PaymentTransaction, STATUS_FAILED, STATUS_PENDING, STATUS_SUCCESS};
use crate::domain::callback::{correlation_values, CallbackVerdict, GatewayCallback};
use crate::store::{StoreResult, TransactionStore};

/// Marker written on audit records for callbacks that matched nothing,
/// so they can be found for manual reconciliation.
pub const ORPHAN_DESCRIPTION: &str =
    "Unmatched gateway callback: no originating transaction found";

pub const DEFAULT_SCAN_LIMIT: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// An existing transaction was updated.
    Matched(Uuid),
    /// No transaction matched; an audit record was inserted.
    Orphaned(Uuid),
}

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn TransactionStore>,
    scan_limit: i64,
}

impl Reconciler {
    pub fn new(store: Arc<dyn TransactionStore>, scan_limit: i64) -> Self {
        Self { store, scan_limit }
    }

    /// Attaches a normalized callback to its transaction, or records it as an
    /// orphan. At most one bounded read and one write per invocation; pending
    /// transactions older than the scan window go unmatched.
    pub async fn reconcile(&self, callback: &GatewayCallback) -> StoreResult<ReconcileOutcome> {
        let ids = callback.correlation_ids();

        if !ids.is_empty() {
            let recent = self.store.list_recent(self.scan_limit, 0).await?;
            if let Some(matched) = recent.iter().find(|tx| payloads_mention(tx, &ids)) {
                let status = match callback.verdict {
                    CallbackVerdict::Success => Some(STATUS_SUCCESS),
                    CallbackVerdict::Failed => Some(STATUS_FAILED),
                    // Unknown outcome: record the callback, keep the status.
                    CallbackVerdict::Unknown => None,
                };
                self.store
                    .record_callback(matched.id, status, &callback.payload)
                    .await?;
                tracing::info!(
                    transaction_id = %matched.id,
                    status = ?status,
                    "gateway callback matched transaction"
                );
                return Ok(ReconcileOutcome::Matched(matched.id));
            }
        }

        let status = match callback.verdict {
            CallbackVerdict::Success => STATUS_SUCCESS,
            CallbackVerdict::Failed => STATUS_FAILED,
            // Indeterminate outcome on an orphan stays pending rather than
            // asserting a failure the gateway never reported.
            CallbackVerdict::Unknown => STATUS_PENDING,
        };
        let audit = PaymentTransaction::orphaned(callback.payload.clone(), status, ORPHAN_DESCRIPTION);
        let inserted = self.store.insert(&audit).await?;
        tracing::warn!(
            transaction_id = %inserted.id,
            merchant_request_id = ?callback.merchant_request_id,
            checkout_request_id = ?callback.checkout_request_id,
            "gateway callback matched no transaction, stored as orphan"
        );
        Ok(ReconcileOutcome::Orphaned(inserted.id))
    }
}

/// Whether either stored gateway payload mentions one of the callback's
/// correlation identifiers.
fn payloads_mention(tx: &PaymentTransaction, ids: &[&str]) -> bool {
    tx.response_payload
        .iter()
        .chain(tx.request_payload.iter())
        .flat_map(correlation_values)
        .any(|value| ids.iter().any(|id| *id == value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryTransactionStore;
    use serde_json::json;

    fn reconciler(store: &InMemoryTransactionStore) -> Reconciler {
        Reconciler::new(Arc::new(store.clone()), DEFAULT_SCAN_LIMIT)
    }

    #[tokio::test]
    async fn test_matches_checkout_request_id_in_response_payload() {
        let store = InMemoryTransactionStore::new();
        let tx = PaymentTransaction::new(
            None,
            Some(json!({"CheckoutRequestID": "ws_1", "ResponseCode": "0"})),
            None,
        );
        store.insert(&tx).await.unwrap();

        let callback = GatewayCallback::normalize(json!({
            "CheckoutRequestID": "ws_1",
            "ResultCode": 0
        }));
        let outcome = reconciler(&store).reconcile(&callback).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Matched(tx.id));
        let updated = store.get(tx.id).await.unwrap();
        assert_eq!(updated.status, STATUS_SUCCESS);
        assert_eq!(updated.callback_payload, Some(callback.payload));
    }

    #[tokio::test]
    async fn test_non_zero_result_code_marks_failed() {
        let store = InMemoryTransactionStore::new();
        let tx = PaymentTransaction::new(
            Some(json!({"MerchantRequestID": "mr_7"})),
            None,
            None,
        );
        store.insert(&tx).await.unwrap();

        let callback = GatewayCallback::normalize(json!({
            "merchantRequestID": "mr_7",
            "ResultCode": 1032,
            "ResultDesc": "Request cancelled by user"
        }));
        reconciler(&store).reconcile(&callback).await.unwrap();

        assert_eq!(store.get(tx.id).await.unwrap().status, STATUS_FAILED);
    }

    #[tokio::test]
    async fn test_unknown_result_code_leaves_status_untouched() {
        let store = InMemoryTransactionStore::new();
        let tx = PaymentTransaction::new(None, Some(json!({"CheckoutRequestID": "ws_2"})), None);
        store.insert(&tx).await.unwrap();

        let callback = GatewayCallback::normalize(json!({"CheckoutRequestID": "ws_2"}));
        reconciler(&store).reconcile(&callback).await.unwrap();

        let updated = store.get(tx.id).await.unwrap();
        assert_eq!(updated.status, STATUS_PENDING);
        assert!(updated.callback_payload.is_some());
    }

    #[tokio::test]
    async fn test_newest_matching_transaction_wins() {
        let store = InMemoryTransactionStore::new();
        let older = PaymentTransaction::new(None, Some(json!({"CheckoutRequestID": "ws_3"})), None);
        let mut newer =
            PaymentTransaction::new(None, Some(json!({"checkoutRequestId": "ws_3"})), None);
        newer.created_at = older.created_at + chrono::Duration::seconds(10);
        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();

        let callback = GatewayCallback::normalize(json!({
            "CheckoutRequestID": "ws_3",
            "ResultCode": 0
        }));
        let outcome = reconciler(&store).reconcile(&callback).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Matched(newer.id));
        assert_eq!(store.get(older.id).await.unwrap().status, STATUS_PENDING);
    }

    #[tokio::test]
    async fn test_unmatched_callback_becomes_orphan_record() {
        let store = InMemoryTransactionStore::new();
        let unrelated = PaymentTransaction::new(None, Some(json!({"CheckoutRequestID": "ws_4"})), None);
        store.insert(&unrelated).await.unwrap();

        let callback = GatewayCallback::normalize(json!({
            "CheckoutRequestID": "ws_unseen",
            "ResultCode": 1
        }));
        let outcome = reconciler(&store).reconcile(&callback).await.unwrap();

        let orphan_id = match outcome {
            ReconcileOutcome::Orphaned(id) => id,
            other => panic!("expected orphan, got {other:?}"),
        };
        assert_eq!(store.len().await, 2);
        let orphan = store.get(orphan_id).await.unwrap();
        assert_eq!(orphan.status, STATUS_FAILED);
        assert_eq!(orphan.description.as_deref(), Some(ORPHAN_DESCRIPTION));
        // The pre-existing record is untouched.
        assert_eq!(store.get(unrelated.id).await.unwrap().status, STATUS_PENDING);
    }

    #[tokio::test]
    async fn test_orphan_without_result_code_stays_pending() {
        let store = InMemoryTransactionStore::new();
        let callback = GatewayCallback::normalize(json!({"MerchantRequestID": "mr_lost"}));

        let outcome = reconciler(&store).reconcile(&callback).await.unwrap();
        let ReconcileOutcome::Orphaned(id) = outcome else {
            panic!("expected orphan");
        };
        assert_eq!(store.get(id).await.unwrap().status, STATUS_PENDING);
    }

    #[tokio::test]
    async fn test_scan_limit_bounds_matching_window() {
        let store = InMemoryTransactionStore::new();
        let mut old = PaymentTransaction::new(None, Some(json!({"CheckoutRequestID": "ws_old"})), None);
        old.created_at = old.created_at - chrono::Duration::hours(1);
        let recent = PaymentTransaction::new(None, Some(json!({"CheckoutRequestID": "ws_new"})), None);
        store.insert(&old).await.unwrap();
        store.insert(&recent).await.unwrap();

        // Window of 1 only sees the recent record, so the old one orphans.
        let tight = Reconciler::new(Arc::new(store.clone()), 1);
        let callback = GatewayCallback::normalize(json!({
            "CheckoutRequestID": "ws_old",
            "ResultCode": 0
        }));
        let outcome = tight.reconcile(&callback).await.unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Orphaned(_)));
        assert_eq!(store.get(old.id).await.unwrap().status, STATUS_PENDING);
    }
}
