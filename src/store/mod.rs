pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::PaymentTransaction;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("transaction {0} not found")]
    NotFound(Uuid),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence port for payment transactions.
///
/// The Postgres adapter backs production; the in-memory adapter backs tests
/// and local runs without a database.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, tx: &PaymentTransaction) -> StoreResult<PaymentTransaction>;

    async fn get(&self, id: Uuid) -> StoreResult<PaymentTransaction>;

    /// Most recent transactions, newest first. The reconciler's bounded scan
    /// depends on this ordering.
    async fn list_recent(&self, limit: i64, offset: i64) -> StoreResult<Vec<PaymentTransaction>>;

    /// Records the callback payload on an existing transaction, optionally
    /// resolving its status. `None` leaves the stored status untouched.
    async fn record_callback(
        &self,
        id: Uuid,
        status: Option<&str>,
        callback: &serde_json::Value,
    ) -> StoreResult<()>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> StoreResult<()>;
}
