//! The extractor that identifies the calling user.
//!
//! Authentication happens upstream; this service trusts the `x-user-id`
//! header set by the gateway. A missing or empty header is rejected before
//! any handler code runs.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The header that carries the caller's user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The header that carries the caller's preferred IANA timezone, used when
/// the caller has no profile row yet.
pub const USER_TIMEZONE_HEADER: &str = "x-user-timezone";

/// The ID of a user, as assigned by the upstream identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a user ID from a raw string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The user ID as a string slice, e.g. for binding to SQL parameters.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(Error::MissingUserId)?;

        Ok(UserId(user_id.to_owned()))
    }
}

/// Read the `x-user-timezone` header from request parts, if present.
pub fn timezone_header(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(USER_TIMEZONE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// The caller's timezone from the `x-user-timezone` header, when present.
///
/// This extractor never rejects; handlers fall back to the profile timezone
/// and then the configured default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneHeader(pub Option<String>);

impl<S> FromRequestParts<S> for TimezoneHeader
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(TimezoneHeader(timezone_header(parts)))
    }
}

#[cfg(test)]
mod user_id_tests {
    use axum::{
        Router,
        http::{HeaderName, HeaderValue, StatusCode},
        routing::get,
    };
    use axum_test::TestServer;

    use crate::UserId;

    async fn whoami(user_id: UserId) -> String {
        user_id.to_string()
    }

    fn test_server() -> TestServer {
        let app = Router::new().route("/whoami", get(whoami));

        TestServer::new(app)
    }

    #[tokio::test]
    async fn extracts_user_id_from_header() {
        let server = test_server();

        let response = server
            .get("/whoami")
            .add_header(
                HeaderName::from_static("x-user-id"),
                HeaderValue::from_static("user-123"),
            )
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(response.text(), "user-123");
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let server = test_server();

        let response = server.get("/whoami").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_empty_header() {
        let server = test_server();

        let response = server
            .get("/whoami")
            .add_header(
                HeaderName::from_static("x-user-id"),
                HeaderValue::from_static("  "),
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
