//! MemberRecord entity <-> model mapper

use rankup_core::entities::MemberRecord;
use rankup_core::value_objects::Snowflake;

use crate::models::MemberRecordModel;

impl From<MemberRecordModel> for MemberRecord {
    fn from(model: MemberRecordModel) -> Self {
        MemberRecord {
            member_id: Snowflake::new(model.member_id),
            message_count: model.message_count,
            voice_minutes: model.voice_minutes,
            join_date: model.join_date,
            last_message_at: model.last_message_at,
            last_advance_at: model.last_advance_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
