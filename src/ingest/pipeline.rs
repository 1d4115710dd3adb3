use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::category::Category;
use super::paths::{clip_key, derive_table_name, resolve_key, sanitize_filename, CLIPS_PREFIX};
use super::tabular::{parse_table, DatasetFormat};
use super::IngestError;
use crate::object_store::ObjectStore;
use crate::storage::models::{MusicClip, SubCategory, Table};
use crate::storage::Database;

/// Stages of a single upload.
///
/// `Idle -> Validating -> (Rejected | Storing) -> Cataloging -> Idle`,
/// with `Rejected -> Idle` closing a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Idle,
    Validating,
    Rejected,
    Storing,
    Cataloging,
}

impl IngestState {
    pub fn can_advance_to(self, next: IngestState) -> bool {
        use IngestState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Rejected)
                | (Validating, Storing)
                | (Storing, Cataloging)
                | (Cataloging, Idle)
                | (Rejected, Idle)
        )
    }
}

/// Tracks one upload through its stages.
struct Run<'a> {
    key: &'a str,
    state: IngestState,
}

impl<'a> Run<'a> {
    fn start(key: &'a str) -> Self {
        let mut run = Self {
            key,
            state: IngestState::Idle,
        };
        run.advance(IngestState::Validating);
        run
    }

    fn advance(&mut self, next: IngestState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal ingest transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::trace!(key = %self.key, from = ?self.state, to = ?next, "Ingest transition");
        self.state = next;
    }
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub property: String,
    pub sub_category: SubCategory,
    pub filename: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub key: String,
    pub filename: String,
    /// False when a catalog row already existed for this file
    pub cataloged: bool,
    /// Table the dataset was imported into
    pub table: Option<String>,
    /// Set when the file was stored but its import failed
    pub import_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub file_removed: bool,
    pub entry_removed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub table: String,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileStats {
    /// Keys found in storage
    pub seen: u64,
    /// Dataset files imported into tables
    pub imported: u64,
    /// Dataset files that failed to import
    pub import_failures: u64,
    /// Catalog rows added
    pub cataloged: u64,
    /// Keys outside any category or outside `property/tab/filename`
    pub skipped: u64,
}

/// Runs uploads, deletions, imports, and the startup reconciliation scan.
///
/// Mutating operations take the caller's `is_admin` verdict and do no
/// authorization beyond honoring it.
pub struct Ingestor {
    db: Database,
    store: Arc<dyn ObjectStore>,
}

impl Ingestor {
    pub fn new(db: Database, store: Arc<dyn ObjectStore>) -> Self {
        Self { db, store }
    }

    // ========================================================================
    // Catalogued uploads
    // ========================================================================

    pub async fn upload(
        &self,
        request: UploadRequest,
        is_admin: bool,
    ) -> Result<UploadOutcome, IngestError> {
        if !is_admin {
            return Err(IngestError::Forbidden);
        }

        let mut run = Run::start(&request.filename);
        let (key, filename) = match validate_upload(&request) {
            Ok(resolved) => resolved,
            Err(e) => {
                run.advance(IngestState::Rejected);
                debug!(filename = %request.filename, error = %e, "Upload rejected");
                run.advance(IngestState::Idle);
                return Err(e);
            }
        };

        run.advance(IngestState::Storing);
        self.store.put(&key, request.data.clone()).await?;

        // A failure past this point leaves an uncatalogued file behind;
        // the next reconciliation scan picks it up.
        run.advance(IngestState::Cataloging);
        let cataloged = self.db.record_upload(
            &request.property,
            request.sub_category,
            &filename,
            Utc::now(),
        )?;
        run.advance(IngestState::Idle);

        info!(key = %key, cataloged, "Stored upload");

        let mut outcome = UploadOutcome {
            key,
            filename,
            cataloged,
            table: None,
            import_error: None,
        };

        if request.sub_category == SubCategory::Dataset {
            match self.import_bytes(&outcome.key, &outcome.filename, &request.data) {
                Ok(summary) => outcome.table = Some(summary.table),
                Err(e) => {
                    warn!(key = %outcome.key, error = %e, "Stored dataset could not be imported");
                    outcome.import_error = Some(e.to_string());
                }
            }
        }

        Ok(outcome)
    }

    /// Remove a stored file and its catalog row. Both steps tolerate absence.
    pub async fn delete(
        &self,
        property: &str,
        sub_category: SubCategory,
        filename: &str,
        is_admin: bool,
    ) -> Result<DeleteOutcome, IngestError> {
        if !is_admin {
            return Err(IngestError::Forbidden);
        }

        let filename = sanitize_filename(filename)?;
        let key = resolve_key(property, sub_category, &filename)?;

        let file_removed = self.store.exists(&key).await?;
        self.store.delete(&key).await?;
        let entry_removed = self.db.delete_entry(property, sub_category, &filename)?;

        info!(key = %key, file_removed, entry_removed, "Deleted upload");
        Ok(DeleteOutcome {
            file_removed,
            entry_removed,
        })
    }

    // ========================================================================
    // Dataset tables
    // ========================================================================

    /// Re-import one stored dataset file into its table.
    pub async fn import_dataset(
        &self,
        key: &str,
        is_admin: bool,
    ) -> Result<ImportSummary, IngestError> {
        if !is_admin {
            return Err(IngestError::Forbidden);
        }
        self.import_key(key).await
    }

    /// Parse a stored dataset file without touching the store.
    pub async fn preview(&self, key: &str) -> Result<Table, IngestError> {
        let filename = key.rsplit('/').next().unwrap_or(key);
        let format = dataset_format(filename)?;
        let data = self.store.get(key).await?;
        parse_table(format, &data).map_err(|source| IngestError::Import {
            key: key.to_string(),
            source,
        })
    }

    async fn import_key(&self, key: &str) -> Result<ImportSummary, IngestError> {
        let filename = key.rsplit('/').next().unwrap_or(key);
        dataset_format(filename)?;
        let data = self.store.get(key).await?;
        self.import_bytes(key, filename, &data)
    }

    fn import_bytes(
        &self,
        key: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<ImportSummary, IngestError> {
        let format = dataset_format(filename)?;
        let name = derive_table_name(filename)?;
        let table = parse_table(format, data).map_err(|source| IngestError::Import {
            key: key.to_string(),
            source,
        })?;
        self.db.replace_table(&name, &table)?;

        let summary = ImportSummary {
            table: name,
            rows: table.rows.len(),
            columns: table.columns.len(),
        };
        info!(
            key = %key,
            table = %summary.table,
            rows = summary.rows,
            columns = summary.columns,
            "Imported dataset"
        );
        Ok(summary)
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Walk the whole store once: re-import every dataset file and add
    /// catalog rows for files at `property/tab/filename` that lack one.
    pub async fn reconcile(&self) -> Result<ReconcileStats, IngestError> {
        let keys = self.store.list().await?;
        let mut stats = ReconcileStats::default();
        let mut table_sources: HashMap<String, String> = HashMap::new();

        for key in keys {
            stats.seen += 1;
            let segments: Vec<&str> = key.split('/').collect();
            let filename = segments.last().copied().unwrap_or_default();

            let Some(category) = Category::classify(filename) else {
                debug!(key = %key, "Skipping file outside every category");
                stats.skipped += 1;
                continue;
            };

            if category == Category::Dataset {
                match self.import_key(&key).await {
                    Ok(summary) => {
                        stats.imported += 1;
                        if let Some(previous) = table_sources.insert(summary.table.clone(), key.clone()) {
                            warn!(
                                table = %summary.table,
                                replaced = %previous,
                                by = %key,
                                "Two dataset files map to the same table"
                            );
                        }
                    }
                    Err(e) => {
                        stats.import_failures += 1;
                        warn!(key = %key, error = %e, "Failed to import dataset");
                    }
                }
            }

            if segments.first() == Some(&CLIPS_PREFIX) {
                continue;
            }

            match segments.as_slice() {
                [property, tab, filename] => match tab.parse::<SubCategory>() {
                    Ok(sub_category) => {
                        if self.db.record_upload(property, sub_category, filename, Utc::now())? {
                            stats.cataloged += 1;
                            info!(key = %key, "Backfilled catalog entry");
                        }
                    }
                    Err(reason) => {
                        stats.skipped += 1;
                        info!(key = %key, reason = %reason, "Skipped cataloging");
                    }
                },
                _ => {
                    stats.skipped += 1;
                    info!(key = %key, "Skipped cataloging (not at property/tab/filename)");
                }
            }
        }

        Ok(stats)
    }

    // ========================================================================
    // Audio clips
    // ========================================================================

    pub async fn upload_clip(
        &self,
        filename: &str,
        data: Bytes,
        title: &str,
        description: Option<&str>,
        is_admin: bool,
    ) -> Result<MusicClip, IngestError> {
        if !is_admin {
            return Err(IngestError::Forbidden);
        }
        if title.trim().is_empty() {
            return Err(IngestError::Validation("title is required".to_string()));
        }
        if filename.trim().is_empty() {
            return Err(IngestError::Validation("No file selected.".to_string()));
        }

        let key = clip_key(filename)?;
        if !Category::Audio.is_allowed(&key) {
            return Err(not_allowed(Category::Audio));
        }

        self.store.put(&key, data).await?;
        let clip = self
            .db
            .add_clip(&key, title.trim(), description.map(str::trim).filter(|d| !d.is_empty()))?;

        info!(clip_id = clip.id, key = %key, "Stored clip");
        Ok(clip)
    }

    /// Remove an uploaded clip's file and row. Returns false for unknown ids.
    pub async fn delete_clip(&self, id: i64, is_admin: bool) -> Result<bool, IngestError> {
        if !is_admin {
            return Err(IngestError::Forbidden);
        }

        let Some(clip) = self.db.get_clip(id)? else {
            return Ok(false);
        };

        let key = clip.filename.replace('\\', "/");
        if let Err(e) = self.store.delete(&key).await {
            warn!(clip_id = id, key = %key, error = %e, "Failed to delete clip file");
        }
        self.db.delete_clip(id)?;

        info!(clip_id = id, "Deleted clip");
        Ok(true)
    }
}

fn not_allowed(category: Category) -> IngestError {
    IngestError::Validation(format!(
        "File type not allowed. Only {} supported.",
        category.allowed_types()
    ))
}

fn dataset_format(filename: &str) -> Result<DatasetFormat, IngestError> {
    DatasetFormat::from_filename(filename).map_err(|_| {
        IngestError::Validation(format!("'{filename}' is not a CSV or NPY dataset"))
    })
}

/// Resolve the storage key and stored filename, or explain the rejection.
fn validate_upload(request: &UploadRequest) -> Result<(String, String), IngestError> {
    if request.filename.trim().is_empty() {
        return Err(IngestError::Validation("No file selected.".to_string()));
    }
    let category = Category::from(request.sub_category);
    let filename = sanitize_filename(&request.filename).map_err(|_| not_allowed(category))?;
    if !category.is_allowed(&filename) {
        return Err(not_allowed(category));
    }
    let key = resolve_key(&request.property, request.sub_category, &filename)?;
    Ok((key, filename))
}
