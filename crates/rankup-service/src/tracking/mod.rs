//! In-process tracking state owned by the service layer
//!
//! Created when the [`ServiceContext`](crate::services::ServiceContext) is
//! built and cleared at shutdown.

mod member_locks;
mod rate_window;
mod voice_tracker;

pub use member_locks::MemberLocks;
pub use rate_window::MessageRateWindow;
pub use voice_tracker::{VoiceStateChange, VoiceTracker, VoiceTransition};

use chrono::Duration;

/// Voice sessions, message rate window and advance locks
#[derive(Debug)]
pub struct TrackingState {
    pub voice: VoiceTracker,
    pub rate_window: MessageRateWindow,
    pub member_locks: MemberLocks,
}

impl TrackingState {
    pub fn new(message_rate_window: Duration) -> Self {
        Self {
            voice: VoiceTracker::new(),
            rate_window: MessageRateWindow::new(message_rate_window),
            member_locks: MemberLocks::new(),
        }
    }

    /// Forget all in-memory state. Returns the number of open voice
    /// sessions dropped without credit.
    pub fn clear(&self) -> usize {
        let dropped = self.voice.clear();
        self.rate_window.clear();
        self.member_locks.clear();
        dropped
    }
}
