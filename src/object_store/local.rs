use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{validate_key, ObjectStore, ObjectStoreError};

/// Local filesystem object store rooted at the upload folder.
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        validate_key(key)?;
        Ok(key
            .split('/')
            .fold(self.base_path.clone(), |path, segment| path.join(segment)))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), ObjectStoreError> {
        let path = self.object_path(key)?;
        let parent = path
            .parent()
            .ok_or_else(|| ObjectStoreError::InvalidKey(key.to_string()))?;
        tokio::fs::create_dir_all(parent).await?;

        // Write beside the target and rename so readers never see a torn file.
        // Hidden temp names are skipped by `list`.
        let tmp = parent.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, &data).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        let path = self.object_path(key)?;
        if !path.is_file() {
            return Err(ObjectStoreError::NotFound(key.to_string()));
        }
        let data = tokio::fs::read(&path).await?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        let path = self.object_path(key)?;
        if path.is_file() {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        let path = self.object_path(key)?;
        Ok(path.is_file())
    }

    async fn list(&self) -> Result<Vec<String>, ObjectStoreError> {
        let base = self.base_path.clone();
        tokio::task::spawn_blocking(move || walk_keys(&base))
            .await
            .map_err(|e| ObjectStoreError::Backend(format!("walk task failed: {e}")))?
    }
}

fn walk_keys(base: &Path) -> Result<Vec<String>, ObjectStoreError> {
    let mut keys = Vec::new();
    for entry in WalkDir::new(base).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            // Only an unreadable root fails the listing
            Err(e) if e.depth() == 0 => return Err(ObjectStoreError::Backend(e.to_string())),
            Err(e) => {
                tracing::warn!(path = ?e.path(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        keys.push(segments.join("/"));
    }
    keys.sort();
    Ok(keys)
}
