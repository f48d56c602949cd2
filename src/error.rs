//! Error types for the fetcher with context and fault classification

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while fetching, verifying or extracting resources
#[derive(Error, Debug)]
pub enum FetchError {
    /// No mirror survived the configured selection policy
    #[error("no usable mirrors configured (secure_only={secure_only})")]
    NoMirrors { secure_only: bool },

    /// Every mirror of a full rotation failed for this resource
    #[error("all mirrors failed while fetching '{resource}'")]
    MirrorsExhausted { resource: String },

    /// A mirror answered, but not with a success status
    #[error("mirror answered '{url}' with HTTP status {status}")]
    Http { url: String, status: u16 },

    /// The request never produced a response (refused, timed out, DNS, ...)
    #[error("request to '{url}' failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client itself could not be constructed
    #[error("failed to build HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    /// The gzip payload is corrupt; the content is suspect regardless of mirror
    #[error("gzip stream from mirror is corrupt")]
    Decompress {
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while streaming resource bytes to disk
    #[error("I/O failure while streaming '{resource}'")]
    Stream {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    /// Local filesystem failure with file context
    #[error("{operation} failed on '{path}'")]
    FileSystem {
        path: PathBuf,
        operation: FileOperation,
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be read or extracted
    #[error("archive '{path}' could not be extracted: {reason}")]
    Archive { path: PathBuf, reason: String },

    /// A downloaded file does not match its expected SHA-1
    #[error("checksum mismatch for '{path}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl FetchError {
    /// Whether this error blames a single mirror rather than the content
    /// or the local machine. Mirror faults are recovered by rotation;
    /// everything else is fatal to the current attempt.
    ///
    /// `FileSystem` is deliberately not a mirror fault: the same error
    /// kind covers hashing, extraction and destination writes, where the
    /// local machine is to blame. A `file://` mirror whose files cannot
    /// be read is still rotated past, but only at the call site that
    /// opened the mirror and knows the path belongs to it.
    pub fn is_mirror_fault(&self) -> bool {
        matches!(
            self,
            FetchError::Http { .. } | FetchError::Transport { .. }
        )
    }

    /// HTTP status carried by this error, or -1 when there is none.
    /// Matches the status value the rotation logs on mirror failure.
    pub fn http_status(&self) -> i32 {
        match self {
            FetchError::Http { status, .. } => i32::from(*status),
            _ => -1,
        }
    }
}

/// File operation kinds for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Read,
    Write,
    Create,
    CreateDir,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::Create => write!(f, "creating"),
            FileOperation::CreateDir => write!(f, "creating directory"),
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
