//! Recommendation endpoints: oracle-generated and catalog keyword matching.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::services::recommend::{self, Skills};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub skills: Option<Skills>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedRecommendations {
    pub recommendations: Option<String>,
}

/// `POST /api/recommendation`
pub async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<GeneratedRecommendations>, ApiError> {
    let Json(body) = body?;
    let Some(llm) = state.llm.as_deref() else {
        return Err(ApiError::Misconfigured("LLM client not configured".into()));
    };
    let student_name = body.student_name.unwrap_or_default();
    let skills = body.skills.map(|s| s.joined()).unwrap_or_default();
    let text = recommend::suggest(llm, &student_name, &skills).await?;
    Ok(Json(GeneratedRecommendations { recommendations: text }))
}

#[derive(Debug, Deserialize)]
pub struct MatchBody {
    #[serde(default)]
    pub skills: Option<Skills>,
}

#[derive(Debug, Serialize)]
pub struct MatchedRecommendations {
    pub recommendations: Vec<String>,
}

/// `POST /api/recommendations`
pub async fn match_catalog(
    State(state): State<AppState>,
    body: Result<Json<MatchBody>, JsonRejection>,
) -> Result<Json<MatchedRecommendations>, ApiError> {
    let Json(body) = body?;
    let skills = body
        .skills
        .filter(|s| !s.is_blank())
        .ok_or_else(|| ApiError::Validation("Skills are required".into()))?;
    Ok(Json(MatchedRecommendations { recommendations: state.catalog.matches(&skills) }))
}
