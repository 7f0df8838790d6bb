use axum::{
    body::Body,
    extract::{Path, State},
    response::Response,
};
use blob_store::validate_blob_name;

use super::RouteState;
use crate::http_objects::FileShareAPIError;

/// Download stored file bytes by blob filename
#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "fileshare",
    responses(
        (status = 200, description = "Raw file bytes as an attachment"),
        (status = BAD_REQUEST, description = "Filename is not a valid blob name"),
        (status = NOT_FOUND, description = "No blob stored under that name")
    ),
)]
pub async fn download_file(
    Path(filename): Path<String>,
    State(state): State<RouteState>,
) -> Result<Response<Body>, FileShareAPIError> {
    // downloads go straight to the blob store by filename, metadata is never
    // consulted
    validate_blob_name(&filename).map_err(|e| FileShareAPIError::bad_request(&e.to_string()))?;
    let meta = state
        .blob_storage
        .head(&filename)
        .await
        .map_err(FileShareAPIError::internal_error)?
        .ok_or_else(|| FileShareAPIError::not_found(&format!("file not found: {filename}")))?;
    let storage_reader = state
        .blob_storage
        .get(meta.location.as_ref())
        .await
        .map_err(FileShareAPIError::internal_error)?;

    Response::builder()
        .header("Content-Type", "application/octet-stream")
        .header("Content-Length", meta.size.to_string())
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from_stream(storage_reader))
        .map_err(|e| FileShareAPIError::internal_error_str(&e.to_string()))
}
