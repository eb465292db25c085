//! `/api/students` handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{Map, Value};

use super::{message, parse_id};
use crate::error::ApiError;
use crate::services::student::{self, Student};
use crate::state::AppState;

/// `GET /api/students`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Student>>, ApiError> {
    Ok(Json(student::list(&state.db).await?))
}

/// `GET /api/students/:id`
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Student>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(student::get(&state.db, id).await?))
}

/// `POST /api/students`: responds 201 with the stored row.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let Json(body) = body?;
    let created = student::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/students/:id`: sets only the supplied fields.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    student::update(&state.db, id, &body).await?;
    Ok(message("Student updated successfully"))
}

/// `DELETE /api/students/:id`
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    student::delete(&state.db, id).await?;
    Ok(message("Student deleted successfully"))
}
