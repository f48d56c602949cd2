//! SHA-1 file hashing for resource integrity checks

use sha1::{Digest, Sha1};
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::error::{FetchError, FileOperation, Result};

const CHUNK_SIZE: usize = 64 * 1024;

/// Stream a file through SHA-1 and return the lowercase hex digest.
pub async fn sha1_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|source| FetchError::FileSystem {
            path: path.to_path_buf(),
            operation: FileOperation::Read,
            source,
        })?;

    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|source| FetchError::FileSystem {
                path: path.to_path_buf(),
                operation: FileOperation::Read,
                source,
            })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
