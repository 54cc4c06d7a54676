//! Command authorization extractor
//!
//! Command routes are guarded by a shared bearer secret (`COMMAND_TOKEN`).
//! When no secret is configured the check is skipped.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::response::ApiError;
use crate::state::AppState;

/// Proof that the caller presented the command token
#[derive(Debug, Clone, Copy)]
pub struct CommandAuth;

#[async_trait]
impl<S> FromRequestParts<S> for CommandAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Some(expected) = app_state.command_token() else {
            return Ok(CommandAuth);
        };

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(ApiError::MissingAuth)?
            .to_str()
            .map_err(|_| ApiError::InvalidToken)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::InvalidToken)?
            .trim();

        if !tokens_match(token.as_bytes(), expected.as_bytes()) {
            tracing::warn!("Rejected command with invalid token");
            return Err(ApiError::InvalidToken);
        }

        Ok(CommandAuth)
    }
}

/// Compare without short-circuiting on the first differing byte
fn tokens_match(given: &[u8], expected: &[u8]) -> bool {
    given.len() == expected.len()
        && given
            .iter()
            .zip(expected)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
