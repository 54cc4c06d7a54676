//! Ports - traits implemented by the infrastructure layers

mod clock;
mod platform;
mod repositories;

pub use clock::{Clock, SystemClock};
pub use platform::{EventSink, RoleGateway};
pub use repositories::{
    BlacklistRepository, LedgerRepository, RepoResult, ResetScheduleRepository,
};
