//! Rank ladder - the ordered rank definitions and their permission tiers

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// How the message and voice thresholds of a rank combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    /// Both thresholds must be met (a zero message requirement counts as met)
    #[default]
    And,
    /// Either threshold is enough
    Or,
}

/// A single rung of the ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankDefinition {
    pub rank_index: usize,
    pub name: String,
    pub role_id: Snowflake,
    pub required_messages: i64,
    pub required_voice_hours: f64,
    pub threshold_mode: ThresholdMode,
    pub permission_id: Option<u32>,
}

impl RankDefinition {
    /// Whether `voice_minutes` reaches the voice threshold, compared in hours
    pub fn voice_requirement_met(&self, voice_minutes: i64) -> bool {
        voice_minutes as f64 / 60.0 >= self.required_voice_hours
    }

    /// Smallest whole minute count that passes [`Self::voice_requirement_met`]
    pub fn required_voice_minutes(&self) -> i64 {
        // `hours * 60` can land a hair above the integer (8.3h -> 498.00000000000006)
        let mut minutes = (self.required_voice_hours * 60.0).ceil() as i64;
        while minutes > 0 && self.voice_requirement_met(minutes - 1) {
            minutes -= 1;
        }
        while !self.voice_requirement_met(minutes) {
            minutes += 1;
        }
        minutes
    }
}

/// A permission role linked to one or more ranks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionTier {
    pub id: u32,
    pub name: String,
    pub role_id: Snowflake,
}

/// Validated, immutable rank ladder
#[derive(Debug, Clone, PartialEq)]
pub struct RankLadder {
    ranks: Vec<RankDefinition>,
    permissions: Vec<PermissionTier>,
}

impl RankLadder {
    /// Build a ladder, checking that it is non-empty, indexed contiguously
    /// from zero, free of duplicate role ids, and that every permission link
    /// resolves.
    pub fn new(
        ranks: Vec<RankDefinition>,
        permissions: Vec<PermissionTier>,
    ) -> Result<Self, DomainError> {
        if ranks.is_empty() {
            return Err(DomainError::InvalidLadder("ladder has no ranks".to_string()));
        }

        let mut seen_roles = HashSet::new();
        for (position, rank) in ranks.iter().enumerate() {
            if rank.rank_index != position {
                return Err(DomainError::InvalidLadder(format!(
                    "rank '{}' has index {} but sits at position {position}",
                    rank.name, rank.rank_index
                )));
            }
            if rank.required_messages < 0
                || !rank.required_voice_hours.is_finite()
                || rank.required_voice_hours < 0.0
            {
                return Err(DomainError::InvalidLadder(format!(
                    "rank '{}' has a negative requirement",
                    rank.name
                )));
            }
            if !seen_roles.insert(rank.role_id) {
                return Err(DomainError::InvalidLadder(format!(
                    "role {} is used more than once",
                    rank.role_id
                )));
            }
            if let Some(permission_id) = rank.permission_id {
                if !permissions.iter().any(|p| p.id == permission_id) {
                    return Err(DomainError::InvalidLadder(format!(
                        "rank '{}' links unknown permission {permission_id}",
                        rank.name
                    )));
                }
            }
        }

        let mut seen_tiers = HashSet::new();
        for tier in &permissions {
            if !seen_tiers.insert(tier.id) {
                return Err(DomainError::InvalidLadder(format!(
                    "permission id {} is used more than once",
                    tier.id
                )));
            }
            if !seen_roles.insert(tier.role_id) {
                return Err(DomainError::InvalidLadder(format!(
                    "role {} is used more than once",
                    tier.role_id
                )));
            }
        }

        Ok(Self { ranks, permissions })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Always false for a validated ladder
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&RankDefinition> {
        self.ranks.get(index)
    }

    pub fn ranks(&self) -> &[RankDefinition] {
        &self.ranks
    }

    pub fn permissions(&self) -> &[PermissionTier] {
        &self.permissions
    }

    /// The entry rank (index 0)
    pub fn entry(&self) -> &RankDefinition {
        &self.ranks[0]
    }

    #[inline]
    pub fn last_index(&self) -> usize {
        self.ranks.len() - 1
    }

    #[inline]
    pub fn is_last(&self, index: usize) -> bool {
        index >= self.last_index()
    }

    /// Highest rank whose role appears in `roles`
    pub fn current_index(&self, roles: &HashSet<Snowflake>) -> Option<usize> {
        self.ranks
            .iter()
            .rposition(|rank| roles.contains(&rank.role_id))
    }

    /// Rank owning the given role, if any
    pub fn rank_for_role(&self, role_id: Snowflake) -> Option<&RankDefinition> {
        self.ranks.iter().find(|rank| rank.role_id == role_id)
    }

    pub fn permission(&self, id: u32) -> Option<&PermissionTier> {
        self.permissions.iter().find(|tier| tier.id == id)
    }

    /// Permission role linked to the rank at `index`
    pub fn permission_role_for(&self, index: usize) -> Option<Snowflake> {
        self.get(index)
            .and_then(|rank| rank.permission_id)
            .and_then(|id| self.permission(id))
            .map(|tier| tier.role_id)
    }

    pub fn rank_role_ids(&self) -> impl Iterator<Item = Snowflake> + '_ {
        self.ranks.iter().map(|rank| rank.role_id)
    }

    pub fn permission_role_ids(&self) -> impl Iterator<Item = Snowflake> + '_ {
        self.permissions.iter().map(|tier| tier.role_id)
    }

    /// Whether a member with `roles` takes part in the rank system.
    /// Holding a rank role is enough, as is holding a permission role.
    pub fn is_ranking_member(&self, roles: &HashSet<Snowflake>) -> bool {
        self.rank_role_ids()
            .chain(self.permission_role_ids())
            .any(|role| roles.contains(&role))
    }
}
