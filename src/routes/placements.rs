//! `/api/placements` handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{Map, Value};

use super::{message, parse_id};
use crate::error::ApiError;
use crate::services::placement::{self, Placement};
use crate::state::AppState;

/// `GET /api/placements`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Placement>>, ApiError> {
    Ok(Json(placement::list(&state.db).await?))
}

/// `GET /api/placements/:id`
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Placement>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(placement::get(&state.db, id).await?))
}

/// `POST /api/placements`: responds 201 with the stored row.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<(StatusCode, Json<Placement>), ApiError> {
    let Json(body) = body?;
    let created = placement::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/placements/:id`: sets only the supplied fields.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    placement::update(&state.db, id, &body).await?;
    Ok(message("Placement updated successfully"))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    placement::delete(&state.db, id).await?;
    Ok(message("Placement deleted successfully"))
}
