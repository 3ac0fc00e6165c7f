use pesalingo_core::config::Config;
use pesalingo_core::db;
use pesalingo_core::services::TranslationService;
use pesalingo_core::startup;
use pesalingo_core::store::postgres::PgTransactionStore;
use pesalingo_core::translate::{
    InMemoryTranslationCache, RedisTranslationCache, TranslateClient, TranslationCache,
};
use pesalingo_core::{create_app, AppState};

use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::create_pool(&config).await?;

    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    let store = Arc::new(PgTransactionStore::new(pool));

    let report = startup::validate_environment(&config, store.as_ref()).await;
    report.log();

    let cache: Arc<dyn TranslationCache> = match &config.redis_url {
        Some(url) => {
            tracing::info!("Using Redis translation cache");
            Arc::new(RedisTranslationCache::new(url)?)
        }
        None => {
            tracing::info!("REDIS_URL not set, using in-process translation cache");
            Arc::new(InMemoryTranslationCache::new())
        }
    };

    let client = TranslateClient::new(
        config.translate_api_url.clone(),
        config.translate_api_key.clone(),
    );
    let translator = TranslationService::new(client, cache);

    let state = AppState::new(store, translator, config.callback_scan_limit);
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
