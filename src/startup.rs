use crate::config::Config;
use crate::store::TransactionStore;
use anyhow::{Context, Result};
use std::time::Duration;

/// Connectivity summary gathered at boot. Failures are reported, not fatal:
/// the service starts degraded rather than crash-looping while a dependency
/// comes up.
pub struct ValidationReport {
    pub database: bool,
    pub redis: bool,
    pub provider: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.database && self.redis && self.provider
    }

    pub fn log(&self) {
        if self.is_valid() {
            tracing::info!("startup validation passed");
            return;
        }
        for error in &self.errors {
            tracing::warn!(error = %error, "startup validation issue");
        }
    }
}

pub async fn validate_environment(
    config: &Config,
    store: &dyn TransactionStore,
) -> ValidationReport {
    let mut report = ValidationReport {
        database: true,
        redis: true,
        provider: true,
        errors: Vec::new(),
    };

    if let Err(e) = store.ping().await {
        report.database = false;
        report.errors.push(format!("Database: {e}"));
    }

    if let Some(redis_url) = &config.redis_url {
        if let Err(e) = validate_redis(redis_url).await {
            report.redis = false;
            report.errors.push(format!("Redis: {e}"));
        }
    }

    if let Err(e) = validate_provider(&config.translate_api_url).await {
        report.provider = false;
        report.errors.push(format!("Translation provider: {e}"));
    }

    report
}

async fn validate_redis(redis_url: &str) -> Result<()> {
    let client = redis::Client::open(redis_url).context("Invalid Redis URL")?;

    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .context("Failed to connect to Redis")?;

    redis::cmd("PING")
        .query_async::<_, String>(&mut conn)
        .await
        .context("Redis PING failed")?;

    Ok(())
}

async fn validate_provider(provider_url: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    client
        .get(provider_url)
        .send()
        .await
        .context("Failed to reach translation provider")?;

    Ok(())
}
