//! Ledger counter selector used by operator stat adjustments

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which ledger counter an adjustment targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    /// `message_count`
    Messages,
    /// `voice_minutes`
    #[serde(alias = "voicetime")]
    VoiceMinutes,
}

impl StatKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::VoiceMinutes => "voice_minutes",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
