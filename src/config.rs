use anyhow::Context;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

use crate::services::reconciler::DEFAULT_SCAN_LIMIT;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    /// Shared translation cache; in-memory when unset.
    pub redis_url: Option<String>,
    pub translate_api_url: String,
    pub translate_api_key: Option<String>,
    /// How many recent transactions the reconciler scans per callback.
    pub callback_scan_limit: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        let translate_api_url = env::var("TRANSLATE_API_URL")?;
        url::Url::parse(&translate_api_url).context("TRANSLATE_API_URL is not a valid URL")?;

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL").ok(),
            translate_api_url,
            translate_api_key: env::var("TRANSLATE_API_KEY").ok(),
            callback_scan_limit: env::var("CALLBACK_SCAN_LIMIT")
                .unwrap_or_else(|_| DEFAULT_SCAN_LIMIT.to_string())
                .parse()?,
        })
    }
}
