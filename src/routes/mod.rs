//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! All JSON endpoints live under `/api` with their own JSON 404 fallback.
//! `/healthz` sits beside them, and when a static directory is configured it
//! serves every remaining path. CORS is open to any origin.

pub mod analysis;
pub mod internships;
pub mod placements;
pub mod recommendations;
pub mod students;
pub mod upload;

use std::path::Path;

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::Json;
use axum::routing::{get, post};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

/// `/api` routes. `max_upload_bytes` caps the multipart upload body.
fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/students", get(students::list).post(students::create))
        .route(
            "/students/{id}",
            get(students::get_one)
                .put(students::update)
                .delete(students::delete),
        )
        .route(
            "/upload",
            post(upload::upload_resume).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/internships", get(internships::list).post(internships::create))
        .route(
            "/internships/{id}",
            get(internships::get_one)
                .put(internships::update)
                .delete(internships::delete),
        )
        .route("/placements", get(placements::list).post(placements::create))
        .route(
            "/placements/{id}",
            get(placements::get_one)
                .put(placements::update)
                .delete(placements::delete),
        )
        .route("/recommendation", post(recommendations::generate))
        .route("/recommendations", post(recommendations::match_catalog))
        .route("/skills/analyze", post(analysis::analyze))
        .fallback(api_not_found)
}

/// Full application router without static file serving.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes(max_upload_bytes))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `dir` for every path the router does not otherwise handle.
pub fn with_static_dir(router: Router, dir: &Path) -> Router {
    router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
}

/// Always 200. `databaseReady` is false until the first successful connect.
async fn healthz(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "databaseReady": state.db.is_ready() }))
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Not found".into())
}

/// Path ids are plain integers; anything else is a client error.
pub(crate) fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ApiError::Validation(format!("Invalid id: {raw}")))
}

pub(crate) fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
