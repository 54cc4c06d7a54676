//! Value objects - immutable types that represent domain concepts

mod snowflake;
mod stat_kind;

pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
pub use stat_kind::StatKind;
