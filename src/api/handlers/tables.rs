use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use crate::api::auth::IsAdmin;
use crate::api::response::{ApiError, JSend};
use crate::ingest::ImportSummary;
use crate::storage::models::Table;
use crate::AppState;

/// Route: GET /tables/:name
pub async fn get_table(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<JSend<Table>>, ApiError> {
    let table = state
        .db
        .read_table(&name)?
        .ok_or_else(|| ApiError::not_found(format!("Table '{name}' not found")))?;
    Ok(JSend::success(table))
}

/// Route: GET /tables/:name/csv
pub async fn export_table(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let csv = state
        .db
        .export_csv(&name)?
        .ok_or_else(|| ApiError::not_found(format!("Table '{name}' not found")))?;

    let mut response = (StatusCode::OK, csv).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    if let Ok(value) = format!("attachment; filename=\"{name}.csv\"").parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

/// Parse a stored dataset without importing it.
/// Route: GET /view/*key
pub async fn preview_view(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<JSend<Table>>, ApiError> {
    let table = state.ingestor.preview(&key).await?;
    Ok(JSend::success(table))
}

/// Route: POST /view/*key
pub async fn import_view(
    State(state): State<Arc<AppState>>,
    is_admin: IsAdmin,
    Path(key): Path<String>,
) -> Result<Json<JSend<ImportSummary>>, ApiError> {
    let summary = state.ingestor.import_dataset(&key, is_admin.0).await?;
    Ok(JSend::success(summary))
}
