//! The resource fetch pipeline
//!
//! Opens a stream against the active mirror, rotating to the next mirror
//! on failure, then pipes bytes through optional gzip decompression into
//! a destination file while reporting percentage progress. One pipeline
//! runs one fetch at a time; concurrent sessions each construct their own
//! [`Fetcher`].

use async_compression::tokio::bufread::GzipDecoder;
use futures::TryStreamExt;
use std::io;
use std::path::Path;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio_util::io::StreamReader;
use tracing::{debug, error, warn};

use crate::config::FetchConfig;
use crate::error::{FetchError, FileOperation, Result};
use crate::fsutil;
use crate::mirror::Mirror;
use crate::progress::{self, ProgressObserver};
use crate::rotation::MirrorRotation;
use crate::stream::SizedStream;

/// Transfer buffer size for the read/write loop
const CHUNK_SIZE: usize = 64 * 1024;

/// Downloads resources from the mirror rotation
pub struct Fetcher {
    client: reqwest::Client,
    rotation: MirrorRotation,
    config: FetchConfig,
}

impl Fetcher {
    /// Build a fetcher for the given mirror registry.
    ///
    /// The HTTP client carries the configured connect and read timeouts;
    /// a stalled mirror therefore fails like any other broken mirror
    /// instead of hanging the transfer forever.
    pub fn new(config: FetchConfig, mirrors: &[Mirror]) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|source| FetchError::Client { source })?;

        let rotation = MirrorRotation::new(&config, mirrors)?;

        Ok(Self {
            client,
            rotation,
            config,
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Open a stream for `rel_path` against the active mirror.
    ///
    /// Any connection failure, non-success status or unreadable local
    /// file counts against the mirror: the rotation promotes the next
    /// candidate and the open is retried, until a full rotation has
    /// failed and [`FetchError::MirrorsExhausted`] is returned. Inability
    /// to determine the content length is not a failure; the stream just
    /// reports an unknown length.
    pub async fn open_stream(&mut self, rel_path: &str) -> Result<SizedStream> {
        loop {
            let mirror = self.rotation.current().clone();
            match self.try_open(&mirror, rel_path).await {
                Ok(stream) => return Ok(stream),
                Err(err) => {
                    warn!(
                        mirror = %mirror.id,
                        status = err.http_status(),
                        error = %err,
                        "mirror failed; trying another one"
                    );
                    if !self.rotation.mark_current_broken() {
                        error!(resource = rel_path, "all mirrors seem broken");
                        return Err(FetchError::MirrorsExhausted {
                            resource: rel_path.to_string(),
                        });
                    }
                }
            }
        }
    }

    async fn try_open(&self, mirror: &Mirror, rel_path: &str) -> Result<SizedStream> {
        if mirror.is_local() {
            let path = mirror
                .local_path(rel_path)
                .unwrap_or_else(|| Path::new(rel_path).to_path_buf());
            let len = tokio::fs::metadata(&path).await.ok().map(|m| m.len());
            let file = tokio::fs::File::open(&path)
                .await
                .map_err(|source| FetchError::FileSystem {
                    path,
                    operation: FileOperation::Read,
                    source,
                })?;
            return Ok(SizedStream::new(file, len));
        }

        let url = mirror.resource_url(rel_path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url,
                status: status.as_u16(),
            });
        }

        let len = response.content_length();
        let body = response
            .bytes_stream()
            .map_err(io::Error::other);
        Ok(SizedStream::new(StreamReader::new(body), len))
    }

    /// Download `rel_path` into `dest`, optionally gunzipping on the fly.
    ///
    /// The observer is told about the task start and then progressed once
    /// per transferred chunk whenever the declared length permits a
    /// percentage. A pre-existing destination is overwritten; a partial
    /// file from a mid-stream failure is left as-is.
    pub async fn download(
        &mut self,
        rel_path: &str,
        dest: &Path,
        decompress: bool,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<()> {
        let observer = progress::or_null(observer);
        let label = dest
            .file_name()
            .map_or_else(|| rel_path.to_string(), |n| n.to_string_lossy().into_owned());
        observer.on_task_changed(&format!("Downloading {label}"));

        fsutil::sweep_pending();

        // Diagnostic-only: a failure here must never affect the primary
        // download's outcome.
        if let Some(snapshot_root) = self.config.snapshot_dir.clone() {
            if let Err(err) = self.write_snapshot(rel_path, &snapshot_root).await {
                warn!(
                    resource = rel_path,
                    error = %err,
                    "mirror snapshot write failed; continuing with the download"
                );
            }
        }

        let stream = self.open_stream(rel_path).await?;
        let declared_len = stream.declared_len();
        let counter = stream.counter();

        let mut reader: Pin<Box<dyn AsyncRead + Send>> = if decompress {
            Box::pin(GzipDecoder::new(BufReader::new(stream)))
        } else {
            Box::pin(stream)
        };

        fsutil::ensure_parent_dir(dest).await;
        fsutil::robust_remove(dest);

        let mut file =
            tokio::fs::File::create(dest)
                .await
                .map_err(|source| FetchError::FileSystem {
                    path: dest.to_path_buf(),
                    operation: FileOperation::Create,
                    source,
                })?;

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut transferred: u64 = 0;
        loop {
            let n = reader.read(&mut buf).await.map_err(|source| {
                if decompress {
                    FetchError::Decompress { source }
                } else {
                    FetchError::Stream {
                        resource: rel_path.to_string(),
                        source,
                    }
                }
            })?;
            if n == 0 {
                break;
            }

            file.write_all(&buf[..n])
                .await
                .map_err(|source| FetchError::FileSystem {
                    path: dest.to_path_buf(),
                    operation: FileOperation::Write,
                    source,
                })?;

            // Raw mirror bytes, not decompressed output: the declared
            // length describes the wire payload.
            transferred += counter.checkpoint();
            if let Some(len) = declared_len.filter(|len| *len > 0) {
                let percent = (transferred as f64 / len as f64 * 100.0).min(100.0);
                observer.on_progressed(percent);
            }
        }

        file.flush()
            .await
            .map_err(|source| FetchError::FileSystem {
                path: dest.to_path_buf(),
                operation: FileOperation::Write,
                source,
            })?;

        debug!(resource = rel_path, dest = %dest.display(), "download complete");
        Ok(())
    }

    /// Persist one unmodified copy of the resource under the snapshot
    /// tree, mirroring the remote path layout.
    async fn write_snapshot(&mut self, rel_path: &str, snapshot_root: &Path) -> Result<()> {
        let dest = snapshot_root.join(rel_path);
        fsutil::ensure_parent_dir(&dest).await;

        let mut stream = self.open_stream(rel_path).await?;
        let mut file =
            tokio::fs::File::create(&dest)
                .await
                .map_err(|source| FetchError::FileSystem {
                    path: dest.clone(),
                    operation: FileOperation::Create,
                    source,
                })?;

        tokio::io::copy(&mut stream, &mut file)
            .await
            .map_err(|source| FetchError::Stream {
                resource: rel_path.to_string(),
                source,
            })?;

        debug!(resource = rel_path, dest = %dest.display(), "mirror snapshot written");
        Ok(())
    }
}
