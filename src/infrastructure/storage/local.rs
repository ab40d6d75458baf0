//! Local filesystem storage backend.
//!
//! Blobs live flat inside a single folder. Stored names are
//! `{unix_millis}-{8 hex chars}-{sanitized requested name}`, so two uploads
//! of the same file never collide.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::{FileStorage, StoredFile, MAX_ATTACHMENT_SIZE};
use crate::shared::error::AppError;

/// Fallback when sanitizing leaves nothing of the requested name.
const UNNAMED: &str = "file";

const TEMP_PREFIX: &str = ".tmp.";

/// Filesystem-backed [`FileStorage`].
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage folder if it does not exist yet and remove temp
    /// files left by writes that never finished.
    pub async fn ensure_destination(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).await?;

        let mut entries = fs::read_dir(&self.root).await?;
        let mut swept = 0usize;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => swept += 1,
                Err(e) => warn!(path = %entry.path().display(), error = %e, "Failed to remove stale temp file"),
            }
        }
        if swept > 0 {
            debug!(count = swept, "Removed stale temp files");
        }
        Ok(())
    }

    /// Resolve a stored name to its path, rejecting anything that is not a
    /// plain file name inside the root.
    fn blob_path(&self, stored_name: &str) -> Result<PathBuf, AppError> {
        if stored_name.is_empty()
            || stored_name.starts_with('.')
            || stored_name.contains(['/', '\\'])
        {
            return Err(AppError::InvalidInput(format!(
                "Invalid stored file name: {}",
                stored_name
            )));
        }
        Ok(self.root.join(stored_name))
    }
}

fn stored_name_for(requested_name: &str) -> String {
    let sanitized = sanitize_filename::sanitize(requested_name);
    let sanitized = sanitized.trim_start_matches('.');
    let sanitized = if sanitized.is_empty() {
        UNNAMED
    } else {
        sanitized
    };

    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", Utc::now().timestamp_millis(), &id[..8], sanitized)
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    #[instrument(skip(self, blob), fields(backend = "local", size = blob.len()))]
    async fn store(&self, blob: &[u8], requested_name: &str) -> Result<StoredFile, AppError> {
        if blob.len() as i64 > MAX_ATTACHMENT_SIZE {
            return Err(AppError::InvalidInput(format!(
                "File exceeds the maximum size of {} bytes",
                MAX_ATTACHMENT_SIZE
            )));
        }

        let name = stored_name_for(requested_name);
        let path = self.blob_path(&name)?;

        // Write under a hidden temp name, then rename into place
        let temp_path = self.root.join(format!("{}{}", TEMP_PREFIX, Uuid::new_v4()));
        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(blob).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &path).await
        }
        .await;

        if let Err(e) = written {
            match fs::remove_file(&temp_path).await {
                Ok(()) => {}
                Err(cleanup) if cleanup.kind() == std::io::ErrorKind::NotFound => {}
                Err(cleanup) => warn!(
                    path = %temp_path.display(),
                    error = %cleanup,
                    "Failed to remove temp file"
                ),
            }
            return Err(e.into());
        }

        debug!(file_name = %name, "Stored file");
        Ok(StoredFile {
            path: path.to_string_lossy().into_owned(),
            name,
        })
    }

    #[instrument(skip(self), fields(backend = "local"))]
    async fn delete(&self, stored_name: &str) -> Result<(), AppError> {
        let path = self.blob_path(stored_name)?;
        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("File {} not found", stored_name))
            } else {
                AppError::Storage(e)
            }
        })
    }
}
