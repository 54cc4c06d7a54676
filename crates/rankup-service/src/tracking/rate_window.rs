//! Per-member message rate window

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use rankup_core::value_objects::Snowflake;

/// Acquisitions between two sweeps of expired stamps
const PRUNE_EVERY: u64 = 512;

/// Admits at most one counted message per member per window
#[derive(Debug)]
pub struct MessageRateWindow {
    window: Duration,
    last_counted: DashMap<Snowflake, DateTime<Utc>>,
    acquisitions: AtomicU64,
}

impl MessageRateWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_counted: DashMap::new(),
            acquisitions: AtomicU64::new(0),
        }
    }

    /// Returns `true` and stamps `at` when the member's last counted
    /// message is at least one window old.
    pub fn try_acquire(&self, member_id: Snowflake, at: DateTime<Utc>) -> bool {
        let admitted = match self.last_counted.entry(member_id) {
            Entry::Occupied(mut entry) => {
                if at - *entry.get() < self.window {
                    false
                } else {
                    entry.insert(at);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(at);
                true
            }
        };

        // The entry guard is gone here; retain locks every shard
        if (self.acquisitions.fetch_add(1, Ordering::Relaxed) + 1) % PRUNE_EVERY == 0 {
            self.prune(at);
        }
        admitted
    }

    /// Forget stamps that can no longer reject anything at `now`
    pub fn prune(&self, now: DateTime<Utc>) {
        self.last_counted.retain(|_, last| now - *last < self.window);
    }

    #[inline]
    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn len(&self) -> usize {
        self.last_counted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_counted.is_empty()
    }

    pub fn clear(&self) {
        self.last_counted.clear();
    }
}
