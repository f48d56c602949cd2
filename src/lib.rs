//! Resilient mirrored resource fetching
//!
//! Given a logical resource name, this crate retrieves the corresponding
//! bytes from one of several interchangeable mirrors, tolerating
//! individual mirror failure by rotating to another, verifying transfer
//! integrity and optionally decompressing or extracting the result while
//! reporting progress to an observer.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use mirror_fetch::{FetchConfig, Fetcher, Mirror, Resource};
//!
//! # async fn example() -> mirror_fetch::Result<()> {
//! let config = FetchConfig::default()
//!     .with_root_dir("/opt/app/resources")
//!     .with_namespace("res");
//!
//! let mirrors = [
//!     Mirror::secure("primary", "https://mirror-a.example.com"),
//!     Mirror::secure("backup", "https://mirror-b.example.com"),
//!     Mirror::insecure("legacy", "http://mirror-c.example.com"),
//! ];
//!
//! let root = config.root_dir.clone();
//! let mut fetcher = Fetcher::new(config, &mirrors)?;
//!
//! let mut library = Resource::new(
//!     "natives/libengine.so.gz",
//!     "da39a3ee5e6b4b0d3255bfef95601890afd80709",
//!     "linux64",
//! );
//! library.mark_extractable();
//!
//! if !library.is_valid(&root).await {
//!     library.download(&mut fetcher, None).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Failure handling follows a small taxonomy: mirror-level faults
//! (refused connections, bad statuses, timeouts) are recovered by
//! rotation and only surface as [`FetchError::MirrorsExhausted`] once a
//! full rotation has failed, while content faults (corrupt gzip, bad
//! archives) and local filesystem faults fail the attempt directly.

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod fsutil;
pub mod hash;
pub mod mirror;
pub mod progress;
pub mod resource;
pub mod rotation;
pub mod stream;

pub use config::{FetchConfig, env_or_empty};
pub use error::{FetchError, FileOperation, Result};
pub use fetch::Fetcher;
pub use mirror::Mirror;
pub use progress::{LogProgress, NullProgress, ProgressObserver};
pub use resource::Resource;
pub use rotation::MirrorRotation;
pub use stream::{ByteCounter, SizedStream};
