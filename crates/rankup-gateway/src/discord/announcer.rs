//! Event sinks: channel announcements and plain logging

use std::sync::Arc;

use async_trait::async_trait;
use rankup_core::{DomainEvent, EventSink, RepoResult, Snowflake};
use reqwest::Method;
use serde_json::json;
use tracing::{info, instrument};

use super::client::DiscordClient;

/// Render the channel message for an event, if the event is announced
pub fn format_announcement(event: &DomainEvent) -> Option<String> {
    match event {
        DomainEvent::StatsReset(e) => {
            let mut content = format!(
                "Activity statistics have been reset for {} members.",
                e.affected_members
            );
            if let Some(next) = e.next_reset_at {
                content.push_str(&format!(" Next reset: <t:{}:F>.", next.timestamp()));
            }
            Some(content)
        }
        DomainEvent::RankAdvanced(e) => Some(format!(
            "<@{}> has advanced to **{}**!",
            e.member_id, e.rank_name
        )),
        _ => None,
    }
}

/// Posts resets and rank advances to an announcement channel
#[derive(Debug, Clone)]
pub struct DiscordAnnouncer {
    client: Arc<DiscordClient>,
    channel_id: Snowflake,
}

impl DiscordAnnouncer {
    pub fn new(client: Arc<DiscordClient>, channel_id: Snowflake) -> Self {
        Self { client, channel_id }
    }

    fn messages_path(&self) -> String {
        format!("channels/{}/messages", self.channel_id)
    }
}

#[async_trait]
impl EventSink for DiscordAnnouncer {
    #[instrument(skip(self, event), fields(event_type = event.event_type()))]
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()> {
        let Some(content) = format_announcement(event) else {
            return Ok(());
        };

        let body = json!({
            "content": content,
            "allowed_mentions": { "parse": ["users"] },
        });
        self.client
            .send(Method::POST, &self.messages_path(), Some(&body), None)
            .await?;
        Ok(())
    }
}

/// Sink used when no announcement channel is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

#[async_trait]
impl EventSink for LogEventSink {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()> {
        info!(
            event_type = event.event_type(),
            member_id = ?event.member_id(),
            timestamp = %event.timestamp(),
            "Domain event"
        );
        Ok(())
    }
}
