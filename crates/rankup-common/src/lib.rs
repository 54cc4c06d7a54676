//! # rankup-common
//!
//! Shared utilities including configuration, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    load_ladder, parse_first_boundary, AppConfig, AppSettings, ConfigError, DatabaseConfig,
    DiscordConfig, Environment, LadderFile, RankConfig, ResetConfig, ServerConfig,
    SnowflakeConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
