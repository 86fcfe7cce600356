//! Caller identity header extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Header carrying the requesting user's identifier.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity used when the header is absent. Authentication lives in front of
/// this service.
pub const DEFAULT_USER_ID: &str = "user-123";

/// Identifier of the user on whose behalf the request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_USER_ID);

        Ok(CallerId(user_id.to_string()))
    }
}
