use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::PaymentTransaction;
use crate::store::{StoreError, StoreResult, TransactionStore};

/// Thread-safe in-memory transaction store.
///
/// Used by tests and local runs where no database is available. Keeps
/// insertion order; `list_recent` sorts newest first like the Postgres
/// adapter.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<Vec<PaymentTransaction>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.transactions.read().await.len()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, tx: &PaymentTransaction) -> StoreResult<PaymentTransaction> {
        let mut transactions = self.transactions.write().await;
        transactions.push(tx.clone());
        Ok(tx.clone())
    }

    async fn get(&self, id: Uuid) -> StoreResult<PaymentTransaction> {
        let transactions = self.transactions.read().await;
        transactions
            .iter()
            .find(|tx| tx.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_recent(
        &self,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<PaymentTransaction>> {
        let transactions = self.transactions.read().await;
        let mut rows: Vec<PaymentTransaction> = transactions.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn record_callback(
        &self,
        id: Uuid,
        status: Option<&str>,
        callback: &serde_json::Value,
    ) -> StoreResult<()> {
        let mut transactions = self.transactions.write().await;
        let tx = transactions
            .iter_mut()
            .find(|tx| tx.id == id)
            .ok_or(StoreError::NotFound(id))?;

        tx.callback_payload = Some(callback.clone());
        if let Some(status) = status {
            tx.status = status.to_string();
        }
        tx.updated_at = Utc::now();
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
