//! Artifact Fetching
//!
//! Model and feature files live on local disk; when a file is absent and a
//! download URL is configured it is fetched once and cached at that path.

use crate::StorageError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A local artifact path with an optional remote fallback
#[derive(Debug, Clone)]
pub struct ArtifactSource {
    /// Local cache location
    pub path: PathBuf,
    /// Download URL used when `path` does not exist
    pub url: Option<String>,
}

impl ArtifactSource {
    pub fn new(path: impl Into<PathBuf>, url: Option<String>) -> Self {
        Self {
            path: path.into(),
            url: url.filter(|u| !u.trim().is_empty()),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.path.exists()
    }

    /// Return the local path, downloading first if needed
    pub async fn ensure_local(&self) -> Result<PathBuf, StorageError> {
        if self.is_cached() {
            return Ok(self.path.clone());
        }

        let Some(url) = &self.url else {
            return Err(StorageError::ArtifactMissing(self.path.clone()));
        };

        info!("Downloading {} to {}", redact(url), self.path.display());
        let bytes = download(url).await?;
        write_atomically(&self.path, &bytes).await?;
        info!("Cached {} bytes at {}", bytes.len(), self.path.display());

        Ok(self.path.clone())
    }
}

async fn download(url: &str) -> Result<Vec<u8>, StorageError> {
    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            warn!("Artifact download failed: {}", e);
            StorageError::Download(e.without_url().to_string())
        })?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| StorageError::Download(e.without_url().to_string()))?;
    Ok(bytes.to_vec())
}

/// Write to a sibling temp file, then rename into place
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".part");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Strip the query string so signed-URL tokens stay out of the logs
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
