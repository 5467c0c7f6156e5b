use std::path::Path;
use std::sync::Arc;

use scout_logging::{scout_info, scout_warn};
use sha2::{Digest, Sha256};

use crate::api::JobApi;
use crate::{ResumeError, UploadOutcome};

/// Hex SHA-256 of the file content.
pub fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Upload, parse, and turn a résumé into a profile.
pub struct ResumeUploader {
    api: Arc<dyn JobApi>,
}

impl ResumeUploader {
    pub fn new(api: Arc<dyn JobApi>) -> Self {
        Self { api }
    }

    /// Skips the upload when the file matches `last_fingerprint`.
    pub async fn upload(
        &self,
        path: &Path,
        last_fingerprint: Option<&str>,
    ) -> Result<UploadOutcome, ResumeError> {
        let bytes = tokio::fs::read(path).await.map_err(|err| ResumeError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let fingerprint = fingerprint(&bytes);
        if last_fingerprint == Some(fingerprint.as_str()) {
            scout_info!("{:?} matches the last upload, skipping", path);
            return Ok(UploadOutcome::Duplicate);
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());

        let uploaded = self
            .api
            .upload_resume(&file_name, bytes)
            .await
            .map_err(ResumeError::Upload)?;
        scout_info!("Uploaded {} to {}", file_name, uploaded.file_url);

        self.api.parse_resume().await.map_err(ResumeError::Parse)?;

        let profile = self
            .api
            .create_profile()
            .await
            .map_err(ResumeError::Profile)?;
        if profile.is_none() {
            scout_warn!("Profile creation returned no profile");
        }
        Ok(UploadOutcome::Uploaded {
            profile,
            fingerprint,
        })
    }
}
