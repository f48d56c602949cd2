//! ZIP archive extraction into a target directory

use std::path::{Path, PathBuf};
use tokio::task;
use tracing::debug;

use crate::error::{FetchError, FileOperation, Result};
use crate::fsutil;

/// Extract a ZIP archive into `out_dir`.
///
/// On macOS this shells out to `/usr/bin/unzip`: application bundles only
/// run when executable permission bits survive extraction, and the system
/// utility restores them reliably. Everywhere else entries are streamed
/// in-process. The first I/O error aborts the whole extraction; there is
/// no partial-extract rollback.
pub async fn extract_zip(archive: &Path, out_dir: &Path) -> Result<()> {
    debug!(archive = %archive.display(), out = %out_dir.display(), "extracting archive");
    if cfg!(target_os = "macos") {
        extract_with_unzip(archive, out_dir).await
    } else {
        extract_in_process(archive.to_path_buf(), out_dir.to_path_buf()).await
    }
}

async fn extract_with_unzip(archive: &Path, out_dir: &Path) -> Result<()> {
    let status = tokio::process::Command::new("/usr/bin/unzip")
        .arg("-o")
        .arg(archive)
        .arg("-d")
        .arg(out_dir)
        .status()
        .await
        .map_err(|err| FetchError::Archive {
            path: archive.to_path_buf(),
            reason: format!("couldn't launch /usr/bin/unzip: {err}"),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(FetchError::Archive {
            path: archive.to_path_buf(),
            reason: format!("unzip exited with {status}"),
        })
    }
}

async fn extract_in_process(archive: PathBuf, out_dir: PathBuf) -> Result<()> {
    let join_path = archive.clone();
    task::spawn_blocking(move || {
        let file = std::fs::File::open(&archive).map_err(|source| FetchError::FileSystem {
            path: archive.clone(),
            operation: FileOperation::Read,
            source,
        })?;

        let mut zip = zip::ZipArchive::new(file).map_err(|err| FetchError::Archive {
            path: archive.clone(),
            reason: err.to_string(),
        })?;

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i).map_err(|err| FetchError::Archive {
                path: archive.clone(),
                reason: err.to_string(),
            })?;

            // Directory entries carry no bytes; file writes create what
            // they need below.
            if entry.is_dir() {
                continue;
            }

            // Entries with absolute or parent-escaping names are dropped.
            let Some(rel) = entry.enclosed_name() else {
                continue;
            };
            let dest = out_dir.join(rel);

            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent).map_err(|source| FetchError::FileSystem {
                    path: parent.to_path_buf(),
                    operation: FileOperation::CreateDir,
                    source,
                })?;
            }

            fsutil::robust_remove(&dest);

            let mut out = std::fs::File::create(&dest).map_err(|source| FetchError::FileSystem {
                path: dest.clone(),
                operation: FileOperation::Create,
                source,
            })?;
            std::io::copy(&mut entry, &mut out).map_err(|source| FetchError::FileSystem {
                path: dest.clone(),
                operation: FileOperation::Write,
                source,
            })?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    let _ = std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(mode));
                }
            }
        }

        Ok(())
    })
    .await
    .map_err(|err| FetchError::Archive {
        path: join_path,
        reason: format!("extraction task failed: {err}"),
    })?
}
