use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use super::clock::Clock;

/// One identifier's standing with the tracker. Absence of a record is the
/// clean state; a record is either accumulating failures inside a window
/// or blocked, in which case `window_start` doubles as the block start.
#[derive(Debug, Clone, Copy)]
struct AttemptRecord {
    count: u32,
    window_start: DateTime<Utc>,
    blocked: bool,
}

/// Sliding-window failed-login tracker with escalation to a timed block.
///
/// Keys are compound (account, origin) identifiers computed by the login
/// flow, so one noisy source does not lock an account out globally. The
/// window length and the block duration are independent knobs: the first
/// bounds how long failures accumulate, the second how long an engaged
/// block lasts. Expired state is observed lazily on the next access; no
/// background pass is needed.
pub struct AttemptTracker {
    records: DashMap<String, AttemptRecord>,
    max_attempts: u32,
    window: Duration,
    block_duration: Duration,
    clock: Arc<dyn Clock>,
}

impl AttemptTracker {
    pub fn new(
        max_attempts: u32,
        window: Duration,
        block_duration: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            records: DashMap::new(),
            max_attempts,
            window,
            block_duration,
            clock,
        }
    }

    /// Whether the identifier is currently blocked. Observing a block whose
    /// duration has elapsed deletes the record (the only exit from the
    /// blocked state).
    pub fn is_blocked(&self, identifier: &str) -> bool {
        let now = self.clock.now();

        if self
            .records
            .remove_if(identifier, |_, record| {
                record.blocked && now >= record.window_start + self.block_duration
            })
            .is_some()
        {
            info!(identifier = %identifier, "Login block expired, record cleared");
            return false;
        }

        self.records
            .get(identifier)
            .map(|record| record.blocked)
            .unwrap_or(false)
    }

    /// Minutes until the block lifts, rounded up for user-facing text.
    /// Zero when the identifier is not blocked.
    pub fn remaining_block_minutes(&self, identifier: &str) -> i64 {
        let now = self.clock.now();

        match self.records.get(identifier) {
            Some(record) if record.blocked => {
                let remaining = (record.window_start + self.block_duration - now)
                    .num_seconds()
                    .max(0);
                (remaining + 59) / 60
            }
            _ => 0,
        }
    }

    /// Record one failed attempt. Returns `true` when this call is the one
    /// that engaged a block. A failure landing after the window has run out
    /// starts a fresh window instead of incrementing the stale count.
    pub fn record_failure(&self, identifier: &str) -> bool {
        let now = self.clock.now();

        let mut entry = self
            .records
            .entry(identifier.to_string())
            .or_insert(AttemptRecord {
                count: 0,
                window_start: now,
                blocked: false,
            });
        let record = entry.value_mut();

        if record.blocked {
            // The login flow rejects blocked identifiers before verifying
            // anything, so failures should not land here; if the block has
            // run out, start over cleanly.
            if now >= record.window_start + self.block_duration {
                *record = AttemptRecord {
                    count: 1,
                    window_start: now,
                    blocked: false,
                };
            }
            return false;
        }

        if now - record.window_start > self.window {
            record.count = 0;
            record.window_start = now;
        }

        record.count += 1;
        debug!(identifier = %identifier, count = record.count, "Recorded failed login attempt");

        if record.count >= self.max_attempts {
            record.blocked = true;
            // The window start now marks the start of the block.
            record.window_start = now;
            warn!(
                identifier = %identifier,
                attempts = record.count,
                block_minutes = self.block_duration.num_minutes(),
                "Failed login threshold reached, identifier blocked"
            );
            return true;
        }

        false
    }

    /// A successful authentication wipes the identifier's history.
    pub fn record_success(&self, identifier: &str) {
        if self.records.remove(identifier).is_some() {
            debug!(identifier = %identifier, "Cleared failed login history after success");
        }
    }
}
