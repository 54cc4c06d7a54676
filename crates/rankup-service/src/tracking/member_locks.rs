//! Keyed async mutex serializing rank changes per member

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use rankup_core::value_objects::Snowflake;

/// One async mutex per member, created on first use
#[derive(Debug, Default)]
pub struct MemberLocks {
    locks: DashMap<Snowflake, Arc<Mutex<()>>>,
}

impl MemberLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `member_id`.
    ///
    /// The map shard is released before awaiting, so contention on one
    /// member never blocks others.
    pub async fn lock(&self, member_id: Snowflake) -> OwnedMutexGuard<()> {
        let mutex = Arc::clone(self.locks.entry(member_id).or_default().value());
        mutex.lock_owned().await
    }

    /// Drop mutexes nobody holds or waits on
    pub fn prune(&self) {
        self.locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    pub fn clear(&self) {
        self.locks.clear();
    }
}
