//! Rank policy evaluator
//!
//! `evaluate` is a pure function of the ledger snapshot, the ladder, the
//! member's current rank and the clock reading. It never touches I/O, so
//! equal inputs always give equal [`Eligibility`] values.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::entities::{MemberRecord, RankDefinition, RankLadder, ThresholdMode};
use crate::error::DomainError;

/// Minimum time between two advances
pub const DEFAULT_COOLDOWN_HOURS: i64 = 48;

/// Progress towards a single threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdProgress {
    pub current: i64,
    pub required: i64,
    pub remaining: i64,
    pub satisfied: bool,
    pub percent: f64,
}

impl ThresholdProgress {
    fn measure(current: i64, required: i64, satisfied: bool) -> Self {
        let percent = if required <= 0 {
            100.0
        } else {
            (current as f64 / required as f64 * 100.0).min(100.0)
        };
        Self {
            current,
            required,
            remaining: (required - current).max(0),
            satisfied,
            percent,
        }
    }
}

/// Status of the rank above the current one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextRankStatus {
    pub rank_index: usize,
    pub name: String,
    pub threshold_mode: ThresholdMode,
    pub messages: ThresholdProgress,
    /// Voice progress, counted in minutes
    pub voice: ThresholdProgress,
    pub meets_thresholds: bool,
}

impl NextRankStatus {
    /// Single progress figure: the lagging threshold for And, the leading one for Or
    pub fn overall_percent(&self) -> f64 {
        match self.threshold_mode {
            ThresholdMode::And => self.messages.percent.min(self.voice.percent),
            ThresholdMode::Or => self.messages.percent.max(self.voice.percent),
        }
    }
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Eligibility {
    pub current_rank: usize,
    pub on_cooldown: bool,
    pub cooldown_remaining_secs: i64,
    /// `None` when the member is on the last rung
    pub next: Option<NextRankStatus>,
}

impl Eligibility {
    #[inline]
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn meets_thresholds(&self) -> bool {
        self.next.as_ref().is_some_and(|next| next.meets_thresholds)
    }

    pub fn can_advance(&self) -> bool {
        !self.on_cooldown && self.meets_thresholds()
    }

    pub fn overall_percent(&self) -> f64 {
        self.next
            .as_ref()
            .map_or(100.0, NextRankStatus::overall_percent)
    }

    /// Map a negative evaluation to the error the coordinator reports.
    /// Cooldown wins over unmet thresholds.
    pub fn blocking_error(&self) -> Option<DomainError> {
        let Some(next) = &self.next else {
            return Some(DomainError::AlreadyMaxRank);
        };
        if self.on_cooldown {
            return Some(DomainError::OnCooldown {
                remaining_secs: self.cooldown_remaining_secs,
            });
        }
        if !next.meets_thresholds {
            return Some(DomainError::RequirementsNotMet {
                remaining_messages: next.messages.remaining,
                remaining_voice_minutes: next.voice.remaining,
            });
        }
        None
    }
}

fn messages_met(mode: ThresholdMode, current: i64, required: i64) -> bool {
    match mode {
        ThresholdMode::And => required == 0 || current >= required,
        ThresholdMode::Or => current >= required,
    }
}

fn next_status(record: &MemberRecord, next: &RankDefinition) -> NextRankStatus {
    let mode = next.threshold_mode;
    let required_minutes = next.required_voice_minutes();

    let messages_ok = messages_met(mode, record.message_count, next.required_messages);
    let voice_ok = next.voice_requirement_met(record.voice_minutes);
    let meets_thresholds = match mode {
        ThresholdMode::And => messages_ok && voice_ok,
        ThresholdMode::Or => messages_ok || voice_ok,
    };

    NextRankStatus {
        rank_index: next.rank_index,
        name: next.name.clone(),
        threshold_mode: mode,
        messages: ThresholdProgress::measure(
            record.message_count,
            next.required_messages,
            messages_ok,
        ),
        voice: ThresholdProgress::measure(record.voice_minutes, required_minutes, voice_ok),
        meets_thresholds,
    }
}

/// Evaluate whether `record` may advance from `current_rank`.
///
/// `current_rank` beyond the ladder is treated as the last rung.
pub fn evaluate(
    record: &MemberRecord,
    ladder: &RankLadder,
    current_rank: usize,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Eligibility {
    let current_rank = current_rank.min(ladder.last_index());

    let remaining = record
        .last_advance_at
        .map(|last| cooldown - (now - last))
        .filter(|left| *left > Duration::zero());

    let next = if ladder.is_last(current_rank) {
        None
    } else {
        ladder
            .get(current_rank + 1)
            .map(|next| next_status(record, next))
    };

    Eligibility {
        current_rank,
        on_cooldown: remaining.is_some(),
        cooldown_remaining_secs: remaining.map_or(0, |left| left.num_seconds().max(1)),
        next,
    }
}
