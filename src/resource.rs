//! Remote resource descriptors
//!
//! A resource is a named downloadable artifact with an expected SHA-1
//! checksum and optional gzip compression. The descriptor only
//! orchestrates: the pipeline downloads, the extractor unpacks and the
//! hasher verifies.

use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{FetchError, Result};
use crate::extract;
use crate::fetch::Fetcher;
use crate::hash;
use crate::progress::{self, ProgressObserver};

/// Compression suffix appended to extractable resources on the mirror
const GZIP_SUFFIX: &str = ".gz";

/// A remote resource that can be downloaded, verified and extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    name: String,
    platform: String,
    sha1: String,
    extractable: bool,
}

impl Resource {
    /// Construct a resource from its filename, SHA-1 checksum (lowercase
    /// hex accepted in any case) and platform qualifier.
    pub fn new<N, S, P>(name: N, sha1: S, platform: P) -> Self
    where
        N: Into<String>,
        S: AsRef<str>,
        P: Into<String>,
    {
        Self {
            name: name.into(),
            platform: platform.into(),
            sha1: sha1.as_ref().trim().to_ascii_lowercase(),
            extractable: false,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    /// Where this resource lives below the root download directory
    pub fn location(&self, root: &Path) -> PathBuf {
        root.join(&self.name)
    }

    /// Whether the destination file is present. Presence only; see
    /// [`is_valid`](Self::is_valid) for checksum verification.
    pub fn exists(&self, root: &Path) -> bool {
        self.location(root).exists()
    }

    /// Verify the destination file against the expected SHA-1.
    ///
    /// Errors with [`FetchError::ChecksumMismatch`] on a wrong digest and
    /// with a filesystem error when the file cannot be hashed at all.
    pub async fn verify(&self, root: &Path) -> Result<()> {
        let path = self.location(root);
        let actual = hash::sha1_file(&path).await?;
        if actual.eq_ignore_ascii_case(&self.sha1) {
            Ok(())
        } else {
            Err(FetchError::ChecksumMismatch {
                path,
                expected: self.sha1.clone(),
                actual,
            })
        }
    }

    /// Whether the destination file is present and matches the expected
    /// SHA-1. A file that cannot be hashed counts as invalid.
    pub async fn is_valid(&self, root: &Path) -> bool {
        if !self.exists(root) {
            return false;
        }
        match self.verify(root).await {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    resource = %self.name,
                    error = %err,
                    "resource failed verification; treating it as absent"
                );
                false
            }
        }
    }

    /// Download this resource through the fetcher's mirror rotation.
    ///
    /// The remote path is `<namespace>/<platform>/<name>`, with the
    /// compression suffix appended when the resource is extractable; the
    /// payload is then gunzipped on the way to `<root>/<name>`.
    pub async fn download(
        &self,
        fetcher: &mut Fetcher,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<()> {
        let suffix = if self.extractable { GZIP_SUFFIX } else { "" };
        let rel_path = format!(
            "{}/{}/{}{}",
            fetcher.config().namespace,
            self.platform,
            self.name,
            suffix
        );
        let dest = fetcher.config().root_dir.join(&self.name);
        fetcher
            .download(&rel_path, &dest, self.extractable, observer)
            .await
    }

    /// Extract this resource (a ZIP archive) flat into `root`.
    pub async fn extract(
        &self,
        root: &Path,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<()> {
        progress::or_null(observer).on_task_changed(&format!("Extracting {}", self.name));
        extract::extract_zip(&self.location(root), root).await
    }

    /// Mark the resource as a gzip-compressed artifact that should be
    /// decompressed on download. Drops the compression suffix from the
    /// stored filename so later path construction is correct.
    pub fn mark_extractable(&mut self) {
        if self.extractable {
            return;
        }
        self.extractable = true;
        if let Some(stripped) = self.name.strip_suffix(GZIP_SUFFIX) {
            self.name.truncate(stripped.len());
        }
    }
}
