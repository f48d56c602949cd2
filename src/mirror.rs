//! Mirror endpoints: alternate locations hosting identical resource content

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix marking a mirror whose base location is a local directory
const LOCAL_SCHEME: &str = "file://";

/// A configured mirror endpoint
///
/// Immutable once constructed. Identity within a rotation comes from pool
/// position, not from these fields; two entries with equal values are
/// still distinct candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mirror {
    pub id: String,
    pub base_url: String,
    /// Served over trusted transport (HTTPS); tried before insecure mirrors
    pub secure: bool,
    /// Injected by a forced-mirror override rather than the registry
    pub forced: bool,
}

impl Mirror {
    pub fn secure<S: Into<String>, U: Into<String>>(id: S, base_url: U) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            secure: true,
            forced: false,
        }
    }

    pub fn insecure<S: Into<String>, U: Into<String>>(id: S, base_url: U) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            secure: false,
            forced: false,
        }
    }

    /// The single entry a forced-mirror override produces
    pub fn forced<U: Into<String>>(base_url: U) -> Self {
        Self {
            id: "user-forced".to_string(),
            base_url: base_url.into(),
            secure: false,
            forced: true,
        }
    }

    /// Whether the base location denotes a local directory (offline/dev mode)
    pub fn is_local(&self) -> bool {
        self.base_url.starts_with(LOCAL_SCHEME)
    }

    /// Local path a relative resource resolves to, for `file://` mirrors
    pub fn local_path(&self, rel: &str) -> Option<PathBuf> {
        let root = self.base_url.strip_prefix(LOCAL_SCHEME)?;
        Some(Path::new(root).join(rel))
    }

    /// Full URL a relative resource resolves to on this mirror
    pub fn resource_url(&self, rel: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            rel.trim_start_matches('/')
        )
    }

    /// One-line description used when a mirror is promoted to active
    pub fn info_string(&self) -> String {
        format!(
            "mirror '{}' at {} (secure: {}, forced: {})",
            self.id, self.base_url, self.secure, self.forced
        )
    }
}
