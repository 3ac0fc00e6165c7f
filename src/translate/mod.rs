pub mod cache;
pub mod chunker;
pub mod client;

pub use cache::{fingerprint, InMemoryTranslationCache, RedisTranslationCache, TranslationCache};
pub use client::{ProviderError, TranslateClient};
