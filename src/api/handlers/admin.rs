use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::clips::{all_clips, ClipResponse};
use crate::api::auth::IsAdmin;
use crate::api::response::{ApiError, JSend};
use crate::storage::models::CatalogEntry;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub uploads: Vec<CatalogEntry>,
    pub clips: Vec<ClipResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Every catalogued upload plus every clip, for the admin dashboard.
pub async fn overview(
    State(state): State<Arc<AppState>>,
    is_admin: IsAdmin,
) -> Result<Json<JSend<OverviewResponse>>, ApiError> {
    is_admin.require()?;

    Ok(JSend::success(OverviewResponse {
        uploads: state.db.list_all()?,
        clips: all_clips(&state)?,
    }))
}
