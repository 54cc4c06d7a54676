//! Configuration structs

mod app_config;
mod boundary;
mod ladder;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, DiscordConfig, Environment, RankConfig,
    ResetConfig, ServerConfig, SnowflakeConfig,
};
pub use boundary::parse_first_boundary;
pub use ladder::{load_ladder, LadderFile, PermissionEntry, RankEntry};
