//! Role gateway backed by the guild member endpoints

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use rankup_core::{RepoResult, RoleGateway, Snowflake};
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

use super::client::DiscordClient;

#[derive(Debug, Deserialize)]
struct GuildMember {
    #[serde(default)]
    roles: Vec<Snowflake>,
}

/// Reads and mutates member roles in one guild
#[derive(Debug, Clone)]
pub struct DiscordRoleGateway {
    client: Arc<DiscordClient>,
    guild_id: Snowflake,
}

impl DiscordRoleGateway {
    pub fn new(client: Arc<DiscordClient>, guild_id: Snowflake) -> Self {
        Self { client, guild_id }
    }

    fn member_path(&self, member_id: Snowflake) -> String {
        format!("guilds/{}/members/{}", self.guild_id, member_id)
    }

    fn member_role_path(&self, member_id: Snowflake, role_id: Snowflake) -> String {
        format!("{}/roles/{}", self.member_path(member_id), role_id)
    }
}

#[async_trait]
impl RoleGateway for DiscordRoleGateway {
    #[instrument(skip(self))]
    async fn member_roles(&self, member_id: Snowflake) -> RepoResult<HashSet<Snowflake>> {
        let member: GuildMember = self.client.get_json(&self.member_path(member_id)).await?;
        Ok(member.roles.into_iter().collect())
    }

    #[instrument(skip(self))]
    async fn grant_role(
        &self,
        member_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> RepoResult<()> {
        self.client
            .send(
                Method::PUT,
                &self.member_role_path(member_id, role_id),
                None,
                Some(reason),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn revoke_role(
        &self,
        member_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> RepoResult<()> {
        self.client
            .send(
                Method::DELETE,
                &self.member_role_path(member_id, role_id),
                None,
                Some(reason),
            )
            .await?;
        Ok(())
    }
}
