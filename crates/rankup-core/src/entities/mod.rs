//! Domain entities - core business objects

mod blacklist;
mod member_record;
mod rank;
mod reset_schedule;
mod voice_session;

pub use blacklist::BlacklistEntry;
pub use member_record::MemberRecord;
pub use rank::{PermissionTier, RankDefinition, RankLadder, ThresholdMode};
pub use reset_schedule::{ResetSchedule, ScheduleCatchUp};
pub use voice_session::{credited_minutes, VoiceSession};
