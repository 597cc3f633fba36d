//! File storage for profile avatars and resumes.
//!
//! Files live under the configured upload root in `avatars/` and
//! `resumes/`. The database only holds the relative path; removing an
//! avatar deletes the underlying file, not just the reference.

use crate::error::{ApiError, ApiResult};
use std::path::{Path, PathBuf};

/// Kind of uploaded asset, determining its subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Avatar,
    Resume,
}

impl UploadKind {
    fn dir(&self) -> &'static str {
        match self {
            UploadKind::Avatar => "avatars",
            UploadKind::Resume => "resumes",
        }
    }
}

/// Filesystem-backed store for uploaded assets.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute path for a stored relative path.
    pub fn absolute(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Persist bytes under a fresh uuid-based name, returning the relative
    /// path to store on the profile.
    pub async fn save(
        &self,
        kind: UploadKind,
        original_name: &str,
        bytes: &[u8],
    ) -> ApiResult<String> {
        let relative = format!(
            "{}/{}.{}",
            kind.dir(),
            uuid::Uuid::now_v7(),
            sanitize_extension(original_name)
        );
        let absolute = self.root.join(&relative);

        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                tracing::error!(error = %e, path = %absolute.display(), "failed to create upload dir");
                ApiError::internal_error("Internal server error")
            })?;
        }
        tokio::fs::write(&absolute, bytes).await.map_err(|e| {
            tracing::error!(error = %e, path = %absolute.display(), "failed to write upload");
            ApiError::internal_error("Internal server error")
        })?;

        Ok(relative)
    }

    /// Delete the underlying file for a stored relative path. A file that is
    /// already gone is not an error.
    pub async fn remove(&self, relative: &str) -> ApiResult<()> {
        let absolute = self.root.join(relative);
        match tokio::fs::remove_file(&absolute).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                tracing::error!(error = %e, path = %absolute.display(), "failed to remove upload");
                Err(ApiError::internal_error("Internal server error"))
            }
        }
    }
}

/// File extension from a client-supplied name, restricted to short
/// alphanumeric suffixes.
fn sanitize_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}
