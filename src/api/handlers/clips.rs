use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::read_upload_form;
use crate::api::auth::IsAdmin;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::drive::{self, DriveClip};
use crate::storage::models::MusicClip;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

/// One playable clip, whether hosted on Drive or uploaded here.
#[derive(Debug, Serialize)]
pub struct ClipResponse {
    /// Row id for uploaded clips; hosted clips have none
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub preview_url: String,
    pub download_url: String,
}

impl From<DriveClip> for ClipResponse {
    fn from(clip: DriveClip) -> Self {
        Self {
            id: None,
            title: clip.title,
            description: clip.description,
            preview_url: clip.preview_url,
            download_url: clip.download_url,
        }
    }
}

impl From<MusicClip> for ClipResponse {
    fn from(clip: MusicClip) -> Self {
        let url = format!("/files/{}", clip.filename.replace('\\', "/"));
        Self {
            id: Some(clip.id),
            title: clip.title,
            description: clip.description.unwrap_or_default(),
            preview_url: url.clone(),
            download_url: url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddDriveClipRequest {
    pub link: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteClipResponse {
    pub deleted: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Hosted clips first, then uploaded clips newest first.
pub async fn list_clips(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<ClipResponse>>>, ApiError> {
    Ok(JSend::success(all_clips(&state)?))
}

pub async fn upload_clip(
    State(state): State<Arc<AppState>>,
    is_admin: IsAdmin,
    multipart: Multipart,
) -> Result<Json<JSend<MusicClip>>, ApiError> {
    is_admin.require()?;

    let form = read_upload_form(multipart, state.config.max_upload_size).await?;
    let title = form.field("title").unwrap_or_default().to_string();
    let description = form.field("description").map(str::to_string);
    let (filename, data) = form
        .file
        .ok_or_else(|| ApiError::bad_request("No file selected."))?;

    let clip = state
        .ingestor
        .upload_clip(&filename, data, &title, description.as_deref(), is_admin.0)
        .await?;
    Ok(JSend::success(clip))
}

pub async fn delete_clip(
    State(state): State<Arc<AppState>>,
    is_admin: IsAdmin,
    Path(id): Path<i64>,
) -> Result<Json<JSend<DeleteClipResponse>>, ApiError> {
    let deleted = state.ingestor.delete_clip(id, is_admin.0).await?;
    Ok(JSend::success(DeleteClipResponse { deleted }))
}

pub async fn add_drive_clip(
    State(state): State<Arc<AppState>>,
    is_admin: IsAdmin,
    AppJson(req): AppJson<AddDriveClipRequest>,
) -> Result<Json<JSend<DriveClip>>, ApiError> {
    is_admin.require()?;
    let clip = drive::add_drive_clip(
        &state.config.drive_music_csv,
        &req.link,
        &req.title,
        &req.description,
    )?;
    Ok(JSend::success(clip))
}

// ============================================================================
// Helpers
// ============================================================================

/// A broken clip list never hides the uploaded clips.
pub(super) fn all_clips(state: &AppState) -> Result<Vec<ClipResponse>, ApiError> {
    let hosted = drive::read_drive_clips(&state.config.drive_music_csv).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to read drive clip list");
        Vec::new()
    });
    let uploaded = state.db.list_clips()?;

    Ok(hosted
        .into_iter()
        .map(ClipResponse::from)
        .chain(uploaded.into_iter().map(ClipResponse::from))
        .collect())
}
