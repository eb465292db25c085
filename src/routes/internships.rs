//! `/api/internships` handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{Map, Value};

use super::{message, parse_id};
use crate::error::ApiError;
use crate::services::internship::{self, Internship};
use crate::state::AppState;

/// `GET /api/internships`: each row carries the student's name when the
/// student still exists.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Internship>>, ApiError> {
    Ok(Json(internship::list(&state.db).await?))
}

/// `GET /api/internships/:id`
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Internship>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(internship::get(&state.db, id).await?))
}

/// `POST /api/internships`: responds 201 with the stored row.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<(StatusCode, Json<Internship>), ApiError> {
    let Json(body) = body?;
    let created = internship::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/internships/:id`: sets only the supplied fields.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    internship::update(&state.db, id, &body).await?;
    Ok(message("Internship updated successfully"))
}

/// `DELETE /api/internships/:id`
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    internship::delete(&state.db, id).await?;
    Ok(message("Internship deleted successfully"))
}
