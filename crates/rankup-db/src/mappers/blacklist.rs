//! BlacklistEntry entity <-> model mapper

use chrono::{DateTime, Utc};
use rankup_core::entities::BlacklistEntry;
use rankup_core::value_objects::Snowflake;

use crate::models::BlacklistModel;

impl From<BlacklistModel> for BlacklistEntry {
    fn from(model: BlacklistModel) -> Self {
        BlacklistEntry {
            member_id: Snowflake::new(model.member_id),
            reason: model.reason,
            issued_by: model.issued_by.map(Snowflake::new),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct BlacklistInsert {
    pub member_id: i64,
    pub reason: Option<String>,
    pub issued_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl BlacklistInsert {
    pub fn new(entry: &BlacklistEntry) -> Self {
        Self {
            member_id: entry.member_id.into_inner(),
            reason: entry.reason.clone(),
            issued_by: entry.issued_by.map(Snowflake::into_inner),
            created_at: entry.created_at,
        }
    }
}
