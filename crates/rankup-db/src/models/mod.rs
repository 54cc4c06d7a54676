//! Database models - SQLx-compatible structs for PostgreSQL tables

mod blacklist;
mod member_record;
mod reset_schedule;
mod voice_session;

pub use blacklist::BlacklistModel;
pub use member_record::MemberRecordModel;
pub use reset_schedule::ResetScheduleModel;
pub use voice_session::VoiceSessionModel;
