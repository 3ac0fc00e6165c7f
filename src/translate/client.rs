use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const PROVIDER_TIMEOUT_SECS: u64 = 30;
// The public provider throttles aggressively; stay under its limit.
const PROVIDER_MAX_RPS: u32 = 5;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("translation provider circuit breaker is open")]
    CircuitBreakerOpen,
}

#[derive(Debug, Serialize)]
struct ProviderRequest {
    q: String,
    source: String,
    target: String,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// HTTP client for the external translation provider.
///
/// One attempt per call, behind a circuit breaker and an outbound rate
/// limiter. There is no retry; callers substitute the original text when a
/// unit fails.
#[derive(Clone)]
pub struct TranslateClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl TranslateClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(Duration::from_secs(30), Duration::from_secs(60));
        let policy = failure_policy::consecutive_failures(3, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        let quota = Quota::per_second(NonZeroU32::new(PROVIDER_MAX_RPS).unwrap());
        let limiter = Arc::new(RateLimiter::direct(quota));

        TranslateClient {
            client,
            base_url,
            api_key,
            circuit_breaker,
            limiter,
        }
    }

    /// Translates one unit of text in a single provider call.
    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError> {
        self.limiter.until_ready().await;

        let url = format!("{}/translate", self.base_url.trim_end_matches('/'));
        let body = ProviderRequest {
            q: text.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            format: "text",
            api_key: self.api_key.clone(),
        };
        let client = self.client.clone();

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.post(&url).json(&body).send().await?;

                if !response.status().is_success() {
                    return Err(ProviderError::Status(response.status()));
                }

                let parsed = response.json::<ProviderResponse>().await?;
                Ok(parsed.translated_text)
            })
            .await;

        match result {
            Ok(translated) => Ok(translated),
            Err(FailsafeError::Rejected) => Err(ProviderError::CircuitBreakerOpen),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}
