//! Rank ladder file loading
//!
//! The ladder is read with the `config` crate, so JSON, TOML and YAML files
//! all work. Field names accept both `snake_case` and the `camelCase` used by
//! older ladder files.

use std::path::Path;

use config::{Config, File};
use rankup_core::{PermissionTier, RankDefinition, RankLadder, Snowflake, ThresholdMode};
use serde::Deserialize;

use super::app_config::ConfigError;

/// Raw ladder file contents
#[derive(Debug, Clone, Deserialize)]
pub struct LadderFile {
    pub ranks: Vec<RankEntry>,
    #[serde(default)]
    pub permissions: Vec<PermissionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankEntry {
    pub name: String,
    #[serde(alias = "roleId", alias = "roleid")]
    pub role_id: Snowflake,
    #[serde(default, alias = "requiredMessages", alias = "requiredmessages")]
    pub required_messages: i64,
    #[serde(default, alias = "requiredVoiceHours", alias = "requiredvoicehours")]
    pub required_voice_hours: f64,
    #[serde(default, alias = "isOrCondition", alias = "isorcondition")]
    pub is_or_condition: bool,
    #[serde(default, alias = "permissionId", alias = "permissionid")]
    pub permission_id: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PermissionEntry {
    pub id: u32,
    pub name: String,
    #[serde(alias = "roleId", alias = "roleid")]
    pub role_id: Snowflake,
}

impl LadderFile {
    /// Read a ladder file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        Config::builder()
            .add_source(File::from(path))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ConfigError::LadderFile(format!("{}: {e}", path.display())))
    }

    /// Parse a ladder from an in-memory JSON document
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(raw, config::FileFormat::Json))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ConfigError::LadderFile(e.to_string()))
    }

    /// Validate into a [`RankLadder`]. Rank indices follow file order.
    pub fn into_ladder(self) -> Result<RankLadder, ConfigError> {
        let ranks = self
            .ranks
            .into_iter()
            .enumerate()
            .map(|(rank_index, entry)| RankDefinition {
                rank_index,
                name: entry.name,
                role_id: entry.role_id,
                required_messages: entry.required_messages,
                required_voice_hours: entry.required_voice_hours,
                threshold_mode: if entry.is_or_condition {
                    ThresholdMode::Or
                } else {
                    ThresholdMode::And
                },
                permission_id: entry.permission_id,
            })
            .collect();

        let permissions = self
            .permissions
            .into_iter()
            .map(|entry| PermissionTier {
                id: entry.id,
                name: entry.name,
                role_id: entry.role_id,
            })
            .collect();

        Ok(RankLadder::new(ranks, permissions)?)
    }
}

/// Load and validate the ladder at `path`
pub fn load_ladder(path: impl AsRef<Path>) -> Result<RankLadder, ConfigError> {
    LadderFile::load(path)?.into_ladder()
}
