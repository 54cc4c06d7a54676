//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use rankup_core::Snowflake;

use crate::response::ApiError;

/// Member ID taken from the `:member_id` path segment
#[derive(Debug, Clone, Copy)]
pub struct MemberIdPath(pub Snowflake);

#[async_trait]
impl<S> FromRequestParts<S> for MemberIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        let member_id = Snowflake::parse(&raw)
            .map_err(|_| ApiError::invalid_path("Invalid member_id format"))?;
        Ok(MemberIdPath(member_id))
    }
}
