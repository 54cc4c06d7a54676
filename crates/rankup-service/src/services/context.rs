//! Service context - dependency container for services
//!
//! Holds the ports, the rank ladder, tunables and the in-process tracking
//! state needed by services.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use tracing::warn;

use rankup_common::RankConfig;
use rankup_core::entities::RankLadder;
use rankup_core::events::DomainEvent;
use rankup_core::traits::{
    BlacklistRepository, Clock, EventSink, LedgerRepository, RepoResult,
    ResetScheduleRepository, RoleGateway, SystemClock,
};
use rankup_core::value_objects::{Snowflake, SnowflakeGenerator};

use crate::tracking::{MemberLocks, MessageRateWindow, TrackingState, VoiceTracker};

use super::error::{ServiceError, ServiceResult};

/// Rank tunables read once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankSettings {
    /// Minimum time between two advances of one member
    pub cooldown: Duration,
    /// Voice stays shorter than this credit nothing
    pub min_voice_session: Duration,
    /// At most one counted message per member per window
    pub message_rate_window: Duration,
}

impl Default for RankSettings {
    fn default() -> Self {
        Self::from(&RankConfig::default())
    }
}

impl From<&RankConfig> for RankSettings {
    fn from(config: &RankConfig) -> Self {
        Self {
            cooldown: config.cooldown(),
            min_voice_session: config.min_voice_session(),
            message_rate_window: config.message_rate_window(),
        }
    }
}

/// Service context containing all dependencies
///
/// Cloning is cheap; clones share the same ports and tracking state.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    ledger_repo: Arc<dyn LedgerRepository>,
    blacklist_repo: Arc<dyn BlacklistRepository>,
    schedule_repo: Arc<dyn ResetScheduleRepository>,

    // Platform
    role_gateway: Arc<dyn RoleGateway>,
    event_sink: Arc<dyn EventSink>,

    // Static configuration
    ladder: Arc<RankLadder>,
    settings: RankSettings,

    clock: Arc<dyn Clock>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    tracking: Arc<TrackingState>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger_repo: Arc<dyn LedgerRepository>,
        blacklist_repo: Arc<dyn BlacklistRepository>,
        schedule_repo: Arc<dyn ResetScheduleRepository>,
        role_gateway: Arc<dyn RoleGateway>,
        event_sink: Arc<dyn EventSink>,
        ladder: Arc<RankLadder>,
        settings: RankSettings,
        clock: Arc<dyn Clock>,
        snowflake_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        let tracking = Arc::new(TrackingState::new(settings.message_rate_window));

        Self {
            ledger_repo,
            blacklist_repo,
            schedule_repo,
            role_gateway,
            event_sink,
            ladder,
            settings,
            clock,
            snowflake_generator,
            tracking,
        }
    }

    // === Repositories ===

    /// Get the activity ledger
    pub fn ledger_repo(&self) -> &dyn LedgerRepository {
        self.ledger_repo.as_ref()
    }

    /// Get the blacklist repository
    pub fn blacklist_repo(&self) -> &dyn BlacklistRepository {
        self.blacklist_repo.as_ref()
    }

    /// Get the reset schedule repository
    pub fn schedule_repo(&self) -> &dyn ResetScheduleRepository {
        self.schedule_repo.as_ref()
    }

    // === Platform ===

    pub fn role_gateway(&self) -> &dyn RoleGateway {
        self.role_gateway.as_ref()
    }

    pub fn event_sink(&self) -> &dyn EventSink {
        self.event_sink.as_ref()
    }

    /// Role set carried by an event, or the platform's current one
    pub async fn resolve_roles(
        &self,
        member_id: Snowflake,
        provided: Option<HashSet<Snowflake>>,
    ) -> RepoResult<HashSet<Snowflake>> {
        match provided {
            Some(roles) => Ok(roles),
            None => self.role_gateway.member_roles(member_id).await,
        }
    }

    /// Publish a domain event. Sink failures are logged, never propagated.
    pub async fn publish(&self, event: DomainEvent) {
        if let Err(e) = self.event_sink.publish(&event).await {
            warn!(
                event_type = event.event_type(),
                member_id = ?event.member_id(),
                error = %e,
                "Failed to publish domain event"
            );
        }
    }

    // === Configuration ===

    pub fn ladder(&self) -> &RankLadder {
        self.ladder.as_ref()
    }

    pub fn settings(&self) -> &RankSettings {
        &self.settings
    }

    // === Runtime ===

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Current time according to the context clock
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Get the snowflake ID generator
    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    // === Tracking state ===

    pub fn tracking(&self) -> &TrackingState {
        self.tracking.as_ref()
    }

    pub fn voice_tracker(&self) -> &VoiceTracker {
        &self.tracking.voice
    }

    pub fn rate_window(&self) -> &MessageRateWindow {
        &self.tracking.rate_window
    }

    pub fn member_locks(&self) -> &MemberLocks {
        &self.tracking.member_locks
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("ranks", &self.ladder.len())
            .field("settings", &self.settings)
            .field("open_voice_sessions", &self.tracking.voice.open_count())
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
///
/// Clock, settings and snowflake generator fall back to defaults.
pub struct ServiceContextBuilder {
    ledger_repo: Option<Arc<dyn LedgerRepository>>,
    blacklist_repo: Option<Arc<dyn BlacklistRepository>>,
    schedule_repo: Option<Arc<dyn ResetScheduleRepository>>,
    role_gateway: Option<Arc<dyn RoleGateway>>,
    event_sink: Option<Arc<dyn EventSink>>,
    ladder: Option<Arc<RankLadder>>,
    settings: Option<RankSettings>,
    clock: Option<Arc<dyn Clock>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            ledger_repo: None,
            blacklist_repo: None,
            schedule_repo: None,
            role_gateway: None,
            event_sink: None,
            ladder: None,
            settings: None,
            clock: None,
            snowflake_generator: None,
        }
    }

    pub fn ledger_repo(mut self, repo: Arc<dyn LedgerRepository>) -> Self {
        self.ledger_repo = Some(repo);
        self
    }

    pub fn blacklist_repo(mut self, repo: Arc<dyn BlacklistRepository>) -> Self {
        self.blacklist_repo = Some(repo);
        self
    }

    pub fn schedule_repo(mut self, repo: Arc<dyn ResetScheduleRepository>) -> Self {
        self.schedule_repo = Some(repo);
        self
    }

    pub fn role_gateway(mut self, gateway: Arc<dyn RoleGateway>) -> Self {
        self.role_gateway = Some(gateway);
        self
    }

    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn ladder(mut self, ladder: Arc<RankLadder>) -> Self {
        self.ladder = Some(ladder);
        self
    }

    pub fn settings(mut self, settings: RankSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.ledger_repo
                .ok_or_else(|| ServiceError::validation("ledger_repo is required"))?,
            self.blacklist_repo
                .ok_or_else(|| ServiceError::validation("blacklist_repo is required"))?,
            self.schedule_repo
                .ok_or_else(|| ServiceError::validation("schedule_repo is required"))?,
            self.role_gateway
                .ok_or_else(|| ServiceError::validation("role_gateway is required"))?,
            self.event_sink
                .ok_or_else(|| ServiceError::validation("event_sink is required"))?,
            self.ladder
                .ok_or_else(|| ServiceError::validation("ladder is required"))?,
            self.settings.unwrap_or_default(),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.snowflake_generator.unwrap_or_default(),
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
