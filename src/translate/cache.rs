//! Content-addressed translation cache.
//!
//! Keys are `(SHA-256(source text), target language)`, so identical input
//! always maps to the same cached output and entries never need invalidation.
//! Cache failures are logged and treated as misses; translation must keep
//! working when the backing store is down.

use async_trait::async_trait;
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const CACHE_PREFIX: &str = "translation:";

/// Deterministic content fingerprint of the source text.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
pub trait TranslationCache: Send + Sync {
    async fn get(&self, fingerprint: &str, target_lang: &str) -> Option<String>;

    async fn put(&self, fingerprint: &str, target_lang: &str, translated: &str);
}

/// Process-local cache for tests and single-instance deployments.
#[derive(Default, Clone)]
pub struct InMemoryTranslationCache {
    entries: Arc<RwLock<HashMap<(String, String), String>>>,
}

impl InMemoryTranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl TranslationCache for InMemoryTranslationCache {
    async fn get(&self, fingerprint: &str, target_lang: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(&(fingerprint.to_string(), target_lang.to_string()))
            .cloned()
    }

    async fn put(&self, fingerprint: &str, target_lang: &str, translated: &str) {
        let mut entries = self.entries.write().await;
        entries.insert(
            (fingerprint.to_string(), target_lang.to_string()),
            translated.to_string(),
        );
    }
}

/// Redis-backed cache shared across instances.
///
/// Entries are written without a TTL; the content-derived key makes stale
/// reads impossible.
#[derive(Clone)]
pub struct RedisTranslationCache {
    client: redis::Client,
}

impl RedisTranslationCache {
    pub fn new(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    fn key(fingerprint: &str, target_lang: &str) -> String {
        format!("{CACHE_PREFIX}{target_lang}:{fingerprint}")
    }
}

#[async_trait]
impl TranslationCache for RedisTranslationCache {
    async fn get(&self, fingerprint: &str, target_lang: &str) -> Option<String> {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "translation cache unreachable, treating as miss");
                return None;
            }
        };

        match conn.get::<_, Option<String>>(Self::key(fingerprint, target_lang)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "translation cache read failed, treating as miss");
                None
            }
        }
    }

    async fn put(&self, fingerprint: &str, target_lang: &str, translated: &str) {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "translation cache unreachable, skipping write");
                return;
            }
        };

        if let Err(e) = conn
            .set::<_, _, ()>(Self::key(fingerprint, target_lang), translated)
            .await
        {
            tracing::warn!(error = %e, "translation cache write failed");
        }
    }
}
