//! Domain events

mod domain_event;

pub use domain_event::{
    BlacklistChangedEvent, DomainEvent, RankChangedEvent, RanksClearedEvent, StatsResetEvent,
};
