//! Cached, chunked translation.
//!
//! Every translated unit (a whole short text, or one paragraph chunk of a
//! long text) is cached under its content fingerprint, so repeat traffic for
//! the same copy never reaches the rate-limited provider. Long inputs are
//! translated chunk by chunk, sequentially; a failed chunk degrades to the
//! original text instead of failing the whole request.

use std::sync::Arc;

use crate::translate::cache::{fingerprint, TranslationCache};
use crate::translate::chunker::{
    should_translate, split_paragraphs, CHUNK_THRESHOLD, PARAGRAPH_SEPARATOR,
};
use crate::translate::client::{ProviderError, TranslateClient};

pub const DEFAULT_SOURCE_LANG: &str = "en";

#[derive(Clone)]
pub struct TranslationService {
    client: TranslateClient,
    cache: Arc<dyn TranslationCache>,
}

impl TranslationService {
    pub fn new(client: TranslateClient, cache: Arc<dyn TranslationCache>) -> Self {
        Self { client, cache }
    }

    /// Translates `text` into `target`.
    ///
    /// Empty input and `target == source` short-circuit without touching the
    /// cache or the network. Short inputs go out in one provider call and the
    /// error, if any, is the caller's to handle; long inputs are chunked and
    /// degrade per chunk.
    pub async fn translate(
        &self,
        text: &str,
        target: &str,
        source: &str,
    ) -> Result<String, ProviderError> {
        if text.is_empty() {
            return Ok(String::new());
        }
        if target.eq_ignore_ascii_case(source) {
            return Ok(text.to_string());
        }

        if text.chars().count() < CHUNK_THRESHOLD {
            return self.translate_unit(text, target, source).await;
        }

        let chunks = split_paragraphs(text);
        let mut translated = Vec::with_capacity(chunks.len());
        // One chunk at a time; the provider rate limit rules out fan-out.
        for chunk in chunks {
            if !should_translate(chunk) {
                translated.push(chunk.to_string());
                continue;
            }
            match self.translate_unit(chunk, target, source).await {
                Ok(text) => translated.push(text),
                Err(e) => {
                    tracing::warn!(error = %e, "chunk translation failed, keeping original text");
                    translated.push(chunk.to_string());
                }
            }
        }
        Ok(translated.join(PARAGRAPH_SEPARATOR))
    }

    /// Cache-aside translation of a single unit.
    async fn translate_unit(
        &self,
        unit: &str,
        target: &str,
        source: &str,
    ) -> Result<String, ProviderError> {
        let fp = fingerprint(unit);
        if let Some(hit) = self.cache.get(&fp, target).await {
            return Ok(hit);
        }

        let translated = self.client.translate(unit, source, target).await?;
        self.cache.put(&fp, target, &translated).await;
        Ok(translated)
    }
}
