//! `POST /api/skills/analyze`: key phrases and entities for free text.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::language::Entity;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub key_phrases: Vec<String>,
    pub entities: Vec<Entity>,
}

pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Json<Analysis>, ApiError> {
    let Json(body) = body?;
    let text = body
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Text is required".into()))?;
    let Some(language) = state.language.as_deref() else {
        return Err(ApiError::Misconfigured("Language service not configured".into()));
    };

    let (key_phrases, entities) = futures::try_join!(language.key_phrases(&text), language.entities(&text))?;
    Ok(Json(Analysis { key_phrases, entities }))
}
