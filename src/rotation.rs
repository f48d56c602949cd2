//! Mirror rotation: failure-driven selection over a shuffled pool
//!
//! Rotation-on-failure is the retry mechanism: there is no timed backoff,
//! only "never retry the same mirror twice in a row, prefer secure
//! transport". The pool is consumed front-to-back as failures occur and
//! refilled once exhausted; the refill is what tells the pipeline a full
//! rotation has failed.

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use crate::mirror::Mirror;

/// Failure-driven mirror selection state
///
/// Owned by the [`crate::Fetcher`] that uses it; independent fetch
/// sessions construct independent rotations.
#[derive(Debug)]
pub struct MirrorRotation {
    /// Immutable registry the pool is rebuilt from
    mirrors: Vec<Mirror>,
    /// Untried mirrors of the current rotation; never contains `current`
    pool: Vec<Mirror>,
    current: Mirror,
    forced: Option<String>,
    secure_only: bool,
}

impl MirrorRotation {
    /// Build a rotation and perform the implicit first reset, so
    /// [`current`](Self::current) is available immediately.
    ///
    /// Fails when the selection policy leaves no candidates, e.g.
    /// `secure_only` with a registry of insecure mirrors.
    pub fn new(config: &FetchConfig, mirrors: &[Mirror]) -> Result<Self> {
        let forced = config.forced_mirror.clone();
        let secure_only = config.secure_only;

        let mut pool = build_pool(mirrors, forced.as_deref(), secure_only);
        if pool.is_empty() {
            return Err(FetchError::NoMirrors { secure_only });
        }

        let current = pool.remove(0);
        debug!("{}", current.info_string());

        Ok(Self {
            mirrors: mirrors.to_vec(),
            pool,
            current,
            forced,
            secure_only,
        })
    }

    /// The active mirror to be used
    pub fn current(&self) -> &Mirror {
        &self.current
    }

    /// Mark the active mirror as broken and promote the next pool entry.
    ///
    /// Returns `false` exactly when the pool was empty and had to be
    /// refilled before promoting: every mirror has now been tried at
    /// least once in this rotation and the caller should give up.
    pub fn mark_current_broken(&mut self) -> bool {
        warn!(mirror = %self.current.id, "mirror marked as broken");

        let mut had_untried = true;
        if self.pool.is_empty() {
            self.pool = build_pool(&self.mirrors, self.forced.as_deref(), self.secure_only);
            had_untried = false;
        }

        // The pool cannot be empty here: a successful construction proves
        // the policy yields at least one candidate.
        self.current = self.pool.remove(0);
        debug!("{}", self.current.info_string());
        had_untried
    }
}

/// Rebuild the pool under the configured selection policy.
///
/// A forced override collapses the pool to a single entry. Otherwise all
/// secure mirrors enter in uniformly random order, followed by all
/// insecure mirrors (also shuffled) unless those are disabled. Secure
/// mirrors are always exhausted before any insecure mirror is tried.
fn build_pool(mirrors: &[Mirror], forced: Option<&str>, secure_only: bool) -> Vec<Mirror> {
    if let Some(url) = forced {
        return vec![Mirror::forced(url)];
    }

    let mut rng = rand::thread_rng();

    let mut pool: Vec<Mirror> = mirrors.iter().filter(|m| m.secure).cloned().collect();
    pool.shuffle(&mut rng);

    if !secure_only {
        let mut insecure: Vec<Mirror> = mirrors.iter().filter(|m| !m.secure).cloned().collect();
        insecure.shuffle(&mut rng);
        pool.extend(insecure);
    }

    pool
}
