//! Image upload handlers.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    routing::{delete, post},
};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::extract::ApiPath;
use crate::middleware::RequireAccount;
use crate::services::uploads::{MAX_UPLOAD_BYTES, UploadError};
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: &'static str,
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/image", post(upload_image))
        .route("/image/{filename}", delete(delete_image))
        .layer(DefaultBodyLimit::max(
            MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
        ))
}

/// Store the multipart field `file`.
#[instrument(skip_all)]
async fn upload_image(
    State(state): State<AppState>,
    RequireAccount(principal): RequireAccount,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_owned();
        let bytes = field.bytes().await?;

        let stored = state.uploads().save(&original_name, &bytes).await?;
        tracing::info!(
            username = %principal.username(),
            filename = %stored.filename,
            "Image uploaded"
        );
        return Ok(Json(UploadResponse {
            success: true,
            message: "File uploaded successfully",
            url: stored.url,
            filename: stored.filename,
        }));
    }

    Err(UploadError::MissingFile.into())
}

#[instrument(skip_all)]
async fn delete_image(
    State(state): State<AppState>,
    RequireAccount(principal): RequireAccount,
    ApiPath(filename): ApiPath<String>,
) -> Result<Json<DeleteResponse>> {
    state.uploads().delete(&filename).await?;
    tracing::info!(
        username = %principal.username(),
        filename = %filename,
        "Image deleted"
    );
    Ok(Json(DeleteResponse {
        success: true,
        message: "File deleted successfully",
    }))
}
