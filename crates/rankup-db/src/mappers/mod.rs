//! Entity to model mappers
//!
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database operations

mod blacklist;
mod member_record;
mod reset_schedule;
mod voice_session;

pub use blacklist::BlacklistInsert;
pub use reset_schedule::ScheduleUpsert;
pub use voice_session::VoiceSessionInsert;
