//! Byte streams annotated with their declared length
//!
//! The fetch pipeline counts raw mirror bytes for progress computation
//! even while the stream is wrapped in a gzip decoder, so the counter is
//! a shared handle that stays usable after the stream itself has been
//! moved into an adapter.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Shared view onto the raw-byte counter of a [`SizedStream`]
#[derive(Debug, Clone, Default)]
pub struct ByteCounter(Arc<AtomicU64>);

impl ByteCounter {
    /// Bytes read since the previous checkpoint; resets the counter to
    /// zero so repeated calls never double count.
    pub fn checkpoint(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }

    fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }
}

/// A byte source with a declared total length and a read counter
///
/// Owns its underlying source exclusively; dropping the stream releases
/// the connection or file handle on every exit path.
pub struct SizedStream {
    inner: Pin<Box<dyn AsyncRead + Send>>,
    declared_len: Option<u64>,
    counter: ByteCounter,
}

impl SizedStream {
    pub fn new<R>(inner: R, declared_len: Option<u64>) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            inner: Box::pin(inner),
            declared_len,
            counter: ByteCounter::default(),
        }
    }

    /// Total length declared by the source; `None` means the progress
    /// fraction cannot be computed.
    pub fn declared_len(&self) -> Option<u64> {
        self.declared_len
    }

    /// Counter handle that survives wrapping the stream in an adapter
    pub fn counter(&self) -> ByteCounter {
        self.counter.clone()
    }
}

impl std::fmt::Debug for SizedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizedStream")
            .field("declared_len", &self.declared_len)
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

impl AsyncRead for SizedStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let me = self.get_mut();
        let before = buf.filled().len();
        match me.inner.as_mut().poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                me.counter.add((buf.filled().len() - before) as u64);
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}
