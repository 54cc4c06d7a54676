//! Blacklist entity - members barred from rank advancement

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// A blacklisted member. Counting continues; advancing does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistEntry {
    pub member_id: Snowflake,
    pub reason: Option<String>,
    pub issued_by: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlacklistEntry {
    pub fn new(
        member_id: Snowflake,
        reason: Option<String>,
        issued_by: Option<Snowflake>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            member_id,
            reason,
            issued_by,
            created_at: at,
            updated_at: at,
        }
    }
}
