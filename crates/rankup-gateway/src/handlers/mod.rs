//! HTTP request handlers
//!
//! Handlers for all API endpoints organized by domain.

pub mod blacklist;
pub mod events;
pub mod health;
pub mod ranks;
pub mod schedule;
pub mod stats;
