//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present). The rank ladder lives in its own file, see [`super::LadderFile`].

use std::env;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use rankup_core::Snowflake;
use serde::Deserialize;

use super::boundary::parse_first_boundary;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub discord: DiscordConfig,
    pub rank: RankConfig,
    pub reset: ResetConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Environment named by `APP_ENV` (after loading `.env`), defaulting to development
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        env::var("APP_ENV")
            .ok()
            .and_then(|s| Self::parse(&s))
            .unwrap_or_default()
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP surface configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret required as a bearer token on `/commands` routes
    #[serde(default)]
    pub command_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Overrides the migrations directory bundled with the database crate
    #[serde(default)]
    pub migrations_path: Option<String>,
}

/// Chat platform REST configuration
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub guild_id: Snowflake,
    pub api_base: String,
    /// Channel receiving reset announcements; announcements are only logged when unset
    pub announce_channel_id: Option<Snowflake>,
    pub request_timeout_secs: u64,
}

/// Rank progression settings
#[derive(Debug, Clone)]
pub struct RankConfig {
    pub ladder_path: String,
    pub cooldown_hours: i64,
    pub min_voice_session_secs: i64,
    pub message_rate_limit_ms: u64,
}

impl RankConfig {
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::hours(self.cooldown_hours)
    }

    #[must_use]
    pub fn min_voice_session(&self) -> Duration {
        Duration::seconds(self.min_voice_session_secs)
    }

    #[must_use]
    pub fn message_rate_window(&self) -> Duration {
        Duration::milliseconds(self.message_rate_limit_ms as i64)
    }
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            ladder_path: default_ladder_path(),
            cooldown_hours: default_cooldown_hours(),
            min_voice_session_secs: default_min_voice_session_secs(),
            message_rate_limit_ms: default_message_rate_limit_ms(),
        }
    }
}

/// Periodic reset settings
#[derive(Debug, Clone)]
pub struct ResetConfig {
    pub interval_days: u32,
    /// Operator supplied first boundary; only used when no schedule is stored
    pub first_boundary: Option<DateTime<Utc>>,
    pub retry_backoff_secs: u64,
}

impl ResetConfig {
    #[must_use]
    pub fn retry_backoff(&self) -> StdDuration {
        StdDuration::from_secs(self.retry_backoff_secs)
    }
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            interval_days: default_interval_days(),
            first_boundary: None,
            retry_backoff_secs: default_retry_backoff_secs(),
        }
    }
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "rankup".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_ladder_path() -> String {
    "config/ladder.json".to_string()
}

fn default_cooldown_hours() -> i64 {
    48
}

fn default_min_voice_session_secs() -> i64 {
    60
}

fn default_message_rate_limit_ms() -> u64 {
    1000
}

fn default_interval_days() -> u32 {
    14
}

fn default_retry_backoff_secs() -> u64 {
    3600 // 1 hour
}

fn parsed<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(var, raw)),
        _ => Ok(None),
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(var))
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let guild_id = required("DISCORD_GUILD_ID")?;
        let guild_id = Snowflake::parse(&guild_id)
            .map_err(|_| ConfigError::InvalidValue("DISCORD_GUILD_ID", guild_id))?;

        let first_boundary = match env::var("RESET_FIRST_BOUNDARY") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_first_boundary(&raw, Utc::now())?),
            _ => None,
        };

        let interval_days = parsed("RESET_INTERVAL_DAYS")?.unwrap_or_else(default_interval_days);
        if interval_days == 0 {
            return Err(ConfigError::InvalidValue(
                "RESET_INTERVAL_DAYS",
                "0".to_string(),
            ));
        }

        let worker_id: u16 = parsed("WORKER_ID")?.unwrap_or(0);
        if worker_id >= 1024 {
            return Err(ConfigError::InvalidValue("WORKER_ID", worker_id.to_string()));
        }

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| default_host()),
                port: parsed("SERVER_PORT")?.unwrap_or_else(default_port),
                command_token: env::var("COMMAND_TOKEN").ok().filter(|t| !t.is_empty()),
                request_timeout_secs: parsed("SERVER_REQUEST_TIMEOUT_SECS")?
                    .unwrap_or_else(default_request_timeout_secs),
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parsed("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parsed("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
                migrations_path: env::var("DATABASE_MIGRATIONS_PATH").ok(),
            },
            discord: DiscordConfig {
                token: required("DISCORD_TOKEN")?,
                guild_id,
                api_base: env::var("DISCORD_API_BASE").unwrap_or_else(|_| default_api_base()),
                announce_channel_id: parsed::<Snowflake>("DISCORD_ANNOUNCE_CHANNEL_ID")?,
                request_timeout_secs: parsed("DISCORD_REQUEST_TIMEOUT_SECS")?.unwrap_or(10),
            },
            rank: RankConfig {
                ladder_path: env::var("RANK_LADDER_PATH").unwrap_or_else(|_| default_ladder_path()),
                cooldown_hours: parsed("RANK_COOLDOWN_HOURS")?.unwrap_or_else(default_cooldown_hours),
                min_voice_session_secs: parsed("RANK_MIN_VOICE_SESSION_SECS")?
                    .unwrap_or_else(default_min_voice_session_secs),
                message_rate_limit_ms: parsed("RANK_MESSAGE_RATE_LIMIT_MS")?
                    .unwrap_or_else(default_message_rate_limit_ms),
            },
            reset: ResetConfig {
                interval_days,
                first_boundary,
                retry_backoff_secs: parsed("RESET_RETRY_BACKOFF_SECS")?
                    .unwrap_or_else(default_retry_backoff_secs),
            },
            snowflake: SnowflakeConfig {
                worker_id,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid reset boundary '{0}': {1}")]
    InvalidBoundary(String, &'static str),

    #[error("Failed to load ladder file: {0}")]
    LadderFile(String),

    #[error(transparent)]
    Ladder(#[from] rankup_core::DomainError),
}
