//! Rank policy - pure eligibility evaluation

mod evaluator;

pub use evaluator::{
    evaluate, Eligibility, NextRankStatus, ThresholdProgress, DEFAULT_COOLDOWN_HOURS,
};
