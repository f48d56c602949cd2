//! Filesystem helpers shared by the pipeline and the extractor

use once_cell::sync::Lazy;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Renamed-but-undeletable files, retried by [`sweep_pending`]
static PENDING_DELETES: Lazy<Mutex<Vec<PathBuf>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Delete a file without letting a locked or in-use file block the caller.
///
/// Direct deletion is attempted first. On failure the file is renamed to
/// a randomized sibling and deletion of that sibling is attempted; if the
/// sibling still cannot be removed it is queued for [`sweep_pending`]. If
/// even the rename fails the file is left in place with a warning.
pub fn robust_remove(path: &Path) {
    if !path.exists() || std::fs::remove_file(path).is_ok() {
        return;
    }

    let suffix: u32 = rand::thread_rng().gen_range(0..100_000);
    let sibling = path.with_file_name(format!("deleteme{suffix:05}"));

    match std::fs::rename(path, &sibling) {
        Ok(()) => {
            if std::fs::remove_file(&sibling).is_err() {
                debug!(path = %sibling.display(), "queued file for deferred removal");
                PENDING_DELETES.lock().unwrap().push(sibling);
            }
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "couldn't delete or rename file; please remove it yourself if it causes problems"
            );
        }
    }
}

/// Retry deletion of files [`robust_remove`] had to leave behind.
pub fn sweep_pending() {
    let pending = std::mem::take(&mut *PENDING_DELETES.lock().unwrap());
    for path in pending {
        if std::fs::remove_file(&path).is_err() && path.exists() {
            PENDING_DELETES.lock().unwrap().push(path);
        }
    }
}

/// Create the parent directory of `path` if it is missing.
///
/// A creation failure is only logged: the subsequent file write will
/// surface the real error with better context.
pub async fn ensure_parent_dir(path: &Path) {
    let Some(parent) = path.parent() else { return };
    if parent.as_os_str().is_empty() || parent.exists() {
        return;
    }
    if let Err(err) = tokio::fs::create_dir_all(parent).await {
        warn!(
            path = %parent.display(),
            error = %err,
            "couldn't create directory; continuing, but writes below it will likely fail"
        );
    }
}
