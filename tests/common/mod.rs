use axum::Router;
use std::sync::Arc;

use pesalingo_core::services::TranslationService;
use pesalingo_core::store::memory::InMemoryTransactionStore;
use pesalingo_core::translate::{InMemoryTranslationCache, TranslateClient};
use pesalingo_core::{create_app, AppState};

pub const TEST_SCAN_LIMIT: i64 = 200;

/// Builds the full router over an in-memory store and cache, with the
/// provider client pointed at `provider_url` (usually a mockito server).
pub fn app(
    store: &InMemoryTransactionStore,
    cache: &InMemoryTranslationCache,
    provider_url: &str,
) -> Router {
    let client = TranslateClient::new(provider_url.to_string(), None);
    let translator = TranslationService::new(client, Arc::new(cache.clone()));
    let state = AppState::new(Arc::new(store.clone()), translator, TEST_SCAN_LIMIT);
    create_app(state)
}
