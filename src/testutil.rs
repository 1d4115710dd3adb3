//! Shared test helpers for router and ingest tests.

use std::sync::Arc;

use crate::api::SharedSecret;
use crate::config::{Config, ServerConfig, StorageConfig};
use crate::object_store::LocalStore;
use crate::storage::Database;
use crate::AppState;

pub const TEST_ADMIN_PASSWORD: &str = "test-admin-password";

/// Create a test AppState with a temporary database and local object store.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let database_path = temp_dir.path().join("data").join("test.db");
    let files_dir = temp_dir.path().join("files");

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            database_path: database_path.to_string_lossy().to_string(),
        },
        storage: StorageConfig {
            local_storage_path: files_dir.to_string_lossy().to_string(),
            ..StorageConfig::default()
        },
        admin_password: Some(TEST_ADMIN_PASSWORD.to_string()),
        drive_music_csv: temp_dir
            .path()
            .join("drive_music.csv")
            .to_string_lossy()
            .to_string(),
        max_upload_size: 1024 * 1024, // 1MB for tests
        reconcile_on_startup: false,
    };

    let db = Database::open(&database_path).expect("Failed to open test database");
    let object_store = LocalStore::new(&files_dir).expect("Failed to create test object store");
    let admin = Arc::new(SharedSecret::new(config.admin_password.clone()));

    Arc::new(AppState::new(config, db, Arc::new(object_store), admin))
}
