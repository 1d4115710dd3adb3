//! patterns-matter - Upload, catalog, and browse materials-science datasets
//!
//! This crate provides:
//! - Category-checked uploads into a swappable object store (local filesystem, GCS)
//! - Import of CSV and NPY datasets into SQLite tables
//! - A catalog log of uploaded files with editable source and description
//! - An audio clip library merged with an external Drive link list
//! - REST API with multipart upload support and admin-gated mutations

pub mod api;
pub mod config;
pub mod drive;
pub mod ingest;
pub mod object_store;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use api::AdminCheck;
use config::Config;
use ingest::Ingestor;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub object_store: Arc<dyn object_store::ObjectStore>,
    pub ingestor: Ingestor,
    pub admin: Arc<dyn AdminCheck>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Database,
        object_store: Arc<dyn object_store::ObjectStore>,
        admin: Arc<dyn AdminCheck>,
    ) -> Self {
        let ingestor = Ingestor::new(db.clone(), Arc::clone(&object_store));
        Self {
            config,
            db,
            object_store,
            ingestor,
            admin,
        }
    }
}
