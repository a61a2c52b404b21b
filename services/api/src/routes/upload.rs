//! Image upload

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    uploads::image_extension,
};

/// Multipart field carrying the image
const FILE_FIELD: &str = "file";

/// Oversized bodies surface while reading the stream and keep their 413
fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(format!("Invalid upload: {}", e.body_text()))
    }
}

/// Store an uploaded image and return its public URL
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let mut multipart =
        multipart.map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e.body_text())))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if image_extension(&content_type).is_none() {
            return Err(ApiError::BadRequest(
                "Only image files can be uploaded".to_string(),
            ));
        }

        let data = field.bytes().await.map_err(multipart_error)?;
        if data.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }

        let size = data.len();
        let url = state
            .images
            .store(data.to_vec(), &content_type)
            .await
            .map_err(|e| {
                error!("Failed to store upload: {:#}", e);
                ApiError::InternalServerError
            })?;

        info!("Stored {} byte image at {}", size, url);
        return Ok((StatusCode::CREATED, Json(json!({ "url": url }))));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}
