use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::ingest::category::extension;
use crate::ingest::resolve_key;
use crate::object_store::ObjectStoreError;
use crate::storage::models::SubCategory;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ResultFileResponse {
    pub property: String,
    pub tab: SubCategory,
    pub filename: String,
    pub extension: Option<String>,
    pub url: String,
}

/// Serve a stored object by key.
/// Route: GET /files/*key
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let data = state.object_store.get(&key).await.map_err(|e| match e {
        ObjectStoreError::NotFound(_) | ObjectStoreError::InvalidKey(_) => {
            ApiError::not_found("File not found")
        }
        _ => ApiError::internal(format!("Failed to retrieve file: {e}")),
    })?;

    let byte_size = data.len() as u64;
    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    let mime_type = mime_guess::from_path(&key).first_or_octet_stream();
    if let Ok(value) = mime_type.as_ref().parse() {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CONTENT_LENGTH, header::HeaderValue::from(byte_size));

    let filename = key.rsplit('/').next().unwrap_or(&key);
    if let Ok(value) = format!("inline; filename=\"{filename}\"").parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}

/// Metadata for a stored results file, for the viewer page.
/// Route: GET /results/:property/:tab/*filename
pub async fn result_info(
    State(state): State<Arc<AppState>>,
    Path((property, tab, filename)): Path<(String, String, String)>,
) -> Result<Json<JSend<ResultFileResponse>>, ApiError> {
    let tab: SubCategory = tab
        .parse()
        .map_err(|_| ApiError::not_found(format!("Unknown tab '{tab}'")))?;
    let key = resolve_key(&property, tab, &filename)?;

    if !state
        .object_store
        .exists(&key)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to check file: {e}")))?
    {
        return Err(ApiError::not_found("File not found"));
    }

    let filename = key.rsplit('/').next().unwrap_or(&key).to_string();
    Ok(JSend::success(ResultFileResponse {
        property,
        tab,
        extension: extension(&filename),
        url: format!("/files/{key}"),
        filename,
    }))
}
