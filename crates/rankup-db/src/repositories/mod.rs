//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in rankup-core.

mod blacklist;
mod error;
mod ledger;
mod reset_schedule;

pub use blacklist::PgBlacklistRepository;
pub use ledger::PgLedgerRepository;
pub use reset_schedule::PgResetScheduleRepository;
