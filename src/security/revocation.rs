use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::clock::Clock;

/// In-memory blacklist of explicitly invalidated session tokens.
///
/// Tokens verify statelessly, so logout cannot wait for natural expiry;
/// revoked tokens are parked here until their own `exp` passes. Entries are
/// keyed by a SHA-256 fingerprint so the map never holds a usable
/// credential, and each entry stores the token's original expiry. Once
/// that is in the past the token is unusable anyway and the entry is
/// dropped, lazily on lookup and in bulk by the periodic sweep.
pub struct RevocationStore {
    entries: DashMap<String, DateTime<Utc>>,
    clock: Arc<dyn Clock>,
}

impl RevocationStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Record a token as revoked until its natural expiry. Idempotent;
    /// revoking a token twice keeps the original entry.
    pub fn revoke(&self, token: &str, expires_at: DateTime<Utc>) {
        let remaining = (expires_at - self.clock.now()).num_seconds();
        self.entries.entry(fingerprint(token)).or_insert(expires_at);
        info!(
            remaining_secs = remaining,
            "Token revoked, blacklist entry lives until the token's own expiry"
        );
    }

    /// O(1) lookup. An entry whose recorded expiry has passed is removed
    /// here and reported as not revoked: the token can no longer be used,
    /// so it is indistinguishable from one that was never revoked.
    pub fn is_revoked(&self, token: &str) -> bool {
        let key = fingerprint(token);
        let now = self.clock.now();

        if self
            .entries
            .remove_if(&key, |_, expires_at| *expires_at <= now)
            .is_some()
        {
            debug!("Dropped revocation entry for a naturally expired token");
            return false;
        }

        self.entries.contains_key(&key)
    }

    /// Delete every entry whose expiry has passed. Returns the number of
    /// evictions. `DashMap::retain` locks one shard at a time, so lookups
    /// are not held up beyond the scan itself.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawn the periodic sweep on its own schedule. The returned handle
    /// must be kept; dropping the store without shutting the sweeper down
    /// leaks the timer task.
    pub fn start_sweeper(self: Arc<Self>, interval: Duration) -> SweeperHandle {
        info!(
            interval_secs = interval.as_secs(),
            "Starting revocation sweeper background task"
        );

        let store = self;
        let notify = Arc::new(Notify::new());
        let shutdown = Arc::clone(&notify);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; a fresh store has
            // nothing to sweep yet.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = store.sweep();
                        if evicted > 0 {
                            info!(evicted, remaining = store.len(), "Revocation sweep complete");
                        } else {
                            debug!(remaining = store.len(), "Revocation sweep found nothing to evict");
                        }
                    }
                    _ = shutdown.notified() => {
                        info!("Revocation sweeper shutting down");
                        break;
                    }
                }
            }
        });

        SweeperHandle {
            shutdown: notify,
            task,
        }
    }
}

/// Cancellation handle for the sweep task.
pub struct SweeperHandle {
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for it to finish its current pass.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Revocation sweeper did not shut down cleanly");
        }
    }
}

/// Hex-encoded SHA-256 of the exact token string.
fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
