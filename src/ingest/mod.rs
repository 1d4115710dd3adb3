//! The upload-ingest-and-catalog pipeline.

pub mod category;
pub mod npy;
pub mod paths;
mod pipeline;
pub mod tabular;

pub use category::{is_allowed, Category};
pub use paths::{derive_table_name, resolve_key, sanitize_filename};
pub use pipeline::{
    DeleteOutcome, ImportSummary, IngestState, Ingestor, ReconcileStats, UploadOutcome,
    UploadRequest,
};
pub use tabular::{parse_table, DatasetFormat, TabularError};

use thiserror::Error;

use crate::object_store::ObjectStoreError;
use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Rejected input; nothing was written.
    #[error("{0}")]
    Validation(String),
    /// A dataset could not be read into a table.
    #[error("failed to import {key}: {source}")]
    Import { key: String, source: TabularError },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("object storage error: {0}")]
    Storage(ObjectStoreError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("admin privileges required")]
    Forbidden,
}

impl From<ObjectStoreError> for IngestError {
    fn from(e: ObjectStoreError) -> Self {
        match e {
            ObjectStoreError::NotFound(key) => IngestError::NotFound(key),
            ObjectStoreError::InvalidKey(key) => {
                IngestError::Validation(format!("invalid path '{key}'"))
            }
            other => IngestError::Storage(other),
        }
    }
}
