use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::auth::IsAdmin;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::storage::models::QueryOutcome;
use crate::storage::StoreError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub sql: String,
}

pub async fn list_query_tables(
    State(state): State<Arc<AppState>>,
    is_admin: IsAdmin,
) -> Result<Json<JSend<Vec<String>>>, ApiError> {
    is_admin.require()?;
    Ok(JSend::success(state.db.list_tables()?))
}

/// Run admin-supplied SQL verbatim. SQLite errors are the caller's mistake.
pub async fn run_query(
    State(state): State<Arc<AppState>>,
    is_admin: IsAdmin,
    AppJson(req): AppJson<QueryRequest>,
) -> Result<Json<JSend<QueryOutcome>>, ApiError> {
    is_admin.require()?;

    let sql = req.sql.trim();
    if sql.is_empty() {
        return Err(ApiError::bad_request("sql must not be empty"));
    }

    tracing::info!(sql = %sql, "Running admin query");
    match state.db.unsafe_execute(sql) {
        Ok(outcome) => Ok(JSend::success(outcome)),
        Err(StoreError::Sqlite(e)) => Err(ApiError::bad_request(format!("Query failed: {e}"))),
        Err(e) => Err(e.into()),
    }
}
