use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use super::read_upload_form;
use crate::api::auth::IsAdmin;
use crate::api::response::{ApiError, AppJson, AppQuery, JSend};
use crate::ingest::{DeleteOutcome, UploadOutcome, UploadRequest};
use crate::storage::models::{CatalogEntry, MusicClip, Patch, SubCategory};
use crate::AppState;

/// Material properties the portal serves, with their display titles.
pub const KNOWN_PROPERTIES: &[(&str, &str)] = &[
    ("bandgap", "Band Gap"),
    ("formation_energy", "Formation Energy"),
    ("melting_point", "Melting Point"),
    ("oxidation_state", "Oxidation State"),
];

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PropertyResponse {
    pub id: &'static str,
    pub title: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MaterialsResponse {
    pub property: PropertyResponse,
    pub tab: SubCategory,
    pub entries: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateMaterialRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub source: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub materials: Vec<CatalogEntry>,
    pub clips: Vec<MusicClip>,
}

/// Distinguishes between a missing field (`None`) and an explicit `null` (`Some(None)`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_properties() -> Json<JSend<Vec<PropertyResponse>>> {
    JSend::success(
        KNOWN_PROPERTIES
            .iter()
            .map(|&(id, title)| PropertyResponse { id, title })
            .collect(),
    )
}

pub async fn list_materials(
    State(state): State<Arc<AppState>>,
    Path((property, tab)): Path<(String, String)>,
) -> Result<Json<JSend<MaterialsResponse>>, ApiError> {
    let (property, tab) = known_location(&property, &tab)?;
    let entries = state.db.list_for(property.id, tab)?;

    Ok(JSend::success(MaterialsResponse {
        property,
        tab,
        entries,
    }))
}

pub async fn upload_material(
    State(state): State<Arc<AppState>>,
    is_admin: IsAdmin,
    Path((property, tab)): Path<(String, String)>,
    multipart: Multipart,
) -> Result<Json<JSend<UploadOutcome>>, ApiError> {
    is_admin.require()?;
    let (property, tab) = known_location(&property, &tab)?;

    let form = read_upload_form(multipart, state.config.max_upload_size).await?;
    let (filename, data) = form
        .file
        .ok_or_else(|| ApiError::bad_request("No file selected."))?;

    let outcome = state
        .ingestor
        .upload(
            UploadRequest {
                property: property.id.to_string(),
                sub_category: tab,
                filename,
                data,
            },
            is_admin.0,
        )
        .await?;

    tracing::debug!(key = %outcome.key, title = property.title, "Uploaded material");
    Ok(JSend::success(outcome))
}

pub async fn update_material(
    State(state): State<Arc<AppState>>,
    is_admin: IsAdmin,
    Path((property, tab, filename)): Path<(String, String, String)>,
    AppJson(req): AppJson<UpdateMaterialRequest>,
) -> Result<Json<JSend<CatalogEntry>>, ApiError> {
    is_admin.require()?;
    let (property, tab) = known_location(&property, &tab)?;

    let source = Patch::from(req.source);
    let description = Patch::from(req.description);
    if source.is_absent() && description.is_absent() {
        return Err(ApiError::bad_request(
            "at least one field (source, description) must be provided",
        ));
    }
    if tab == SubCategory::Results && !source.is_absent() {
        return Err(ApiError::bad_request("source is only tracked for datasets"));
    }

    if !state
        .db
        .update_metadata(property.id, tab, &filename, &source, &description)?
    {
        return Err(ApiError::not_found("Catalog entry not found"));
    }

    let entry = state
        .db
        .get_entry(property.id, tab, &filename)?
        .ok_or_else(|| ApiError::internal("Catalog entry not found after update"))?;

    tracing::debug!(property = property.id, tab = %tab, filename = %filename, "Updated catalog entry");
    Ok(JSend::success(entry))
}

pub async fn delete_material(
    State(state): State<Arc<AppState>>,
    is_admin: IsAdmin,
    Path((property, tab, filename)): Path<(String, String, String)>,
) -> Result<Json<JSend<DeleteOutcome>>, ApiError> {
    is_admin.require()?;
    let (property, tab) = known_location(&property, &tab)?;

    let outcome = state
        .ingestor
        .delete(property.id, tab, &filename, is_admin.0)
        .await?;
    Ok(JSend::success(outcome))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<SearchParams>,
) -> Result<Json<JSend<SearchResponse>>, ApiError> {
    let query = params.q.trim().to_lowercase();
    if query.is_empty() {
        return Ok(JSend::success(SearchResponse {
            query,
            materials: Vec::new(),
            clips: Vec::new(),
        }));
    }

    let materials = state.db.search(&query)?;
    let clips = state.db.search_clips(&query)?;
    Ok(JSend::success(SearchResponse {
        query,
        materials,
        clips,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn known_location(property: &str, tab: &str) -> Result<(PropertyResponse, SubCategory), ApiError> {
    let property = KNOWN_PROPERTIES
        .iter()
        .find(|(id, _)| *id == property)
        .map(|&(id, title)| PropertyResponse { id, title })
        .ok_or_else(|| ApiError::not_found(format!("Unknown property '{property}'")))?;
    let tab = tab
        .parse::<SubCategory>()
        .map_err(|_| ApiError::not_found(format!("Unknown tab '{tab}'")))?;
    Ok((property, tab))
}
