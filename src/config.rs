//! Configuration surface injected by the embedding application

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a fetch session
///
/// Everything the pipeline needs to know about the caller's policy lives
/// here: mirror overrides, transport security, where resources land on
/// disk and the optional debug snapshot mode. There are no ambient
/// globals; a [`crate::Fetcher`] is constructed from one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Pin every fetch to this single mirror URL, bypassing selection policy
    pub forced_mirror: Option<String>,
    /// Never try mirrors that are not flagged secure
    pub secure_only: bool,
    /// Root directory resources are downloaded into and extracted under
    pub root_dir: PathBuf,
    /// Fixed first segment of every remote resource path
    pub namespace: String,
    /// Debug mode: persist every fetched byte stream unmodified under this
    /// mirror-shaped directory tree. `None` disables the snapshot path.
    pub snapshot_dir: Option<PathBuf>,
    /// TCP connect timeout; a timeout counts as a mirror failure
    pub connect_timeout: Duration,
    /// Whole-request timeout; a stalled mirror fails instead of hanging
    pub read_timeout: Duration,
    pub user_agent: String,
}

impl FetchConfig {
    pub fn with_forced_mirror<S: Into<String>>(mut self, url: S) -> Self {
        self.forced_mirror = Some(url.into());
        self
    }

    pub fn with_secure_only(mut self, secure_only: bool) -> Self {
        self.secure_only = secure_only;
        self
    }

    pub fn with_root_dir<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root_dir = root.into();
        self
    }

    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_snapshot_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            forced_mirror: None,
            secure_only: false,
            root_dir: PathBuf::from("resources"),
            namespace: "res".to_string(),
            snapshot_dir: None,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(300),
            user_agent: format!("mirror-fetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Environment lookup that never fails: missing variables read as empty.
pub fn env_or_empty(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}
