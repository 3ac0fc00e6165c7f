use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::PaymentTransaction;
use crate::store::{StoreError, StoreResult, TransactionStore};

/// Postgres-backed transaction store.
#[derive(Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn insert(&self, tx: &PaymentTransaction) -> StoreResult<PaymentTransaction> {
        let inserted = sqlx::query_as::<_, PaymentTransaction>(
            r#"
            INSERT INTO payment_transactions (
                id, status, description, request_payload, response_payload,
                callback_payload, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tx.id)
        .bind(&tx.status)
        .bind(&tx.description)
        .bind(&tx.request_payload)
        .bind(&tx.response_payload)
        .bind(&tx.callback_payload)
        .bind(tx.created_at)
        .bind(tx.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn get(&self, id: Uuid) -> StoreResult<PaymentTransaction> {
        sqlx::query_as::<_, PaymentTransaction>(
            "SELECT * FROM payment_transactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    async fn list_recent(
        &self,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<PaymentTransaction>> {
        let rows = sqlx::query_as::<_, PaymentTransaction>(
            "SELECT * FROM payment_transactions ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn record_callback(
        &self,
        id: Uuid,
        status: Option<&str>,
        callback: &serde_json::Value,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE payment_transactions
            SET callback_payload = $2, status = COALESCE($3, status), updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(callback)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
