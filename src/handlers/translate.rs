use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::services::translator::DEFAULT_SOURCE_LANG;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: Option<String>,
    pub texts: Option<Vec<String>>,
    pub target: Option<String>,
    pub source: Option<String>,
}

/// Translation endpoint.
///
/// Single-text requests surface provider failures as 502. Batch requests
/// always return 200; a failed item keeps its original text.
pub async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let target = request
        .target
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("target is required".to_string()))?;
    let source = request.source.as_deref().unwrap_or(DEFAULT_SOURCE_LANG);

    if let Some(texts) = request.texts {
        let mut translated = Vec::with_capacity(texts.len());
        for text in &texts {
            match state.translator.translate(text, target, source).await {
                Ok(t) => translated.push(t),
                Err(e) => {
                    tracing::warn!(error = %e, "batch item translation failed, keeping original");
                    translated.push(text.clone());
                }
            }
        }
        return Ok(Json(json!({ "translated": translated })));
    }

    let text = request
        .text
        .ok_or_else(|| AppError::Validation("text or texts is required".to_string()))?;

    let translated = state
        .translator
        .translate(&text, target, source)
        .await
        .map_err(|e| AppError::BadGateway(e.to_string()))?;

    Ok(Json(json!({ "translated": translated })))
}
