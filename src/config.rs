use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Shared admin secret. `None` disables every mutating route.
    pub admin_password: Option<String>,
    /// CSV list of externally hosted clips (title, description, preview_url, download_url)
    pub drive_music_csv: String,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
    /// Run the reconciliation scan before serving requests
    pub reconcile_on_startup: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// SQLite database file holding the catalog, clips, and imported tables
    pub database_path: String,
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Gcs,
    Local,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Upload root for the local storage backend
    pub local_storage_path: String,
    /// GCS bucket name (required when backend is gcs)
    pub gcs_bucket: Option<String>,
    /// Path to GCS service account JSON (optional, defaults to ADC)
    pub gcs_credentials_file: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            database_path: "./patterns-matter.db".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            local_storage_path: "./uploads".to_string(),
            gcs_bucket: None,
            gcs_credentials_file: None,
        }
    }
}

const MOUNTED_DRIVE_CSV: &str = "/data/drive_music.csv";

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./patterns-matter.db".to_string());

        let admin_password = std::env::var("ADMIN_PASSWORD").ok();

        // Prefer the mounted volume when present, fall back to the working directory
        let drive_music_csv = std::env::var("DRIVE_MUSIC_CSV").unwrap_or_else(|_| {
            if Path::new(MOUNTED_DRIVE_CSV).exists() {
                MOUNTED_DRIVE_CSV.to_string()
            } else {
                "drive_music.csv".to_string()
            }
        });

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50 * 1024 * 1024); // 50MB

        let reconcile_on_startup = std::env::var("RECONCILE_ON_STARTUP")
            .map(|v| !(v == "false" || v == "0"))
            .unwrap_or(true);

        let storage_backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "gcs" => StorageBackend::Gcs,
            _ => StorageBackend::Local,
        };

        let local_storage_path =
            std::env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./uploads".to_string());

        let gcs_bucket = std::env::var("GCS_BUCKET").ok();
        let gcs_credentials_file = std::env::var("GCS_CREDENTIALS_FILE").ok();

        let config = Config {
            server: ServerConfig {
                bind_address,
                database_path,
            },
            storage: StorageConfig {
                backend: storage_backend,
                local_storage_path,
                gcs_bucket,
                gcs_credentials_file,
            },
            admin_password,
            drive_music_csv,
            max_upload_size,
            reconcile_on_startup,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.database_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "DATABASE_PATH cannot be empty".to_string(),
            ));
        }

        if matches!(self.storage.backend, StorageBackend::Gcs) && self.storage.gcs_bucket.is_none()
        {
            return Err(ConfigError::ValidationError(
                "GCS_BUCKET is required when STORAGE_BACKEND=gcs".to_string(),
            ));
        }

        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        match self.admin_password.as_deref() {
            None => tracing::warn!("ADMIN_PASSWORD is not set. Admin routes will reject every request."),
            Some(p) if p.trim().is_empty() => {
                return Err(ConfigError::ValidationError(
                    "ADMIN_PASSWORD cannot be empty when set".to_string(),
                ));
            }
            Some(_) => {}
        }

        Ok(())
    }
}
