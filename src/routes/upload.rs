//! `POST /api/upload`: resume upload returning a time-limited read URL.

use axum::extract::{Multipart, State};
use axum::response::Json;
use serde::Serialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Reads the `file` multipart field and stores it via the upload service.
/// Other fields are ignored. The database is never touched.
#[instrument(skip(state, multipart))]
pub async fn upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let uploads = state.uploads.clone()?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("upload")
            .to_string();
        let content_type = field.content_type().map(str::to_owned);
        let payload = field.bytes().await?;

        let blob = uploads
            .upload(payload, &file_name, content_type.as_deref())
            .await?;
        return Ok(Json(UploadResponse { url: blob.url }));
    }

    Err(ApiError::Validation("No file uploaded".into()))
}
