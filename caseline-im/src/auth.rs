//! Caller identity extraction
//!
//! Identity arrives as an `X-User-Id` header carrying a UUID, set by
//! the fronting gateway after it authenticates the request. A missing
//! or malformed header is rejected with 401 before the handler runs.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller, extracted per-request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

        let value = header
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Invalid X-User-Id header".to_string()))?;

        let user_id = Uuid::parse_str(value.trim())
            .map_err(|_| ApiError::Unauthorized("Invalid X-User-Id header".to_string()))?;

        Ok(CurrentUser(user_id))
    }
}
