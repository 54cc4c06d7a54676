//! Axum extractors for request handling
//!
//! Custom extractors for command authorization, validation, and path IDs.

mod auth;
mod path;
mod validated;

pub use auth::CommandAuth;
pub use path::MemberIdPath;
pub use validated::{OptionalValidatedJson, ValidatedJson};
