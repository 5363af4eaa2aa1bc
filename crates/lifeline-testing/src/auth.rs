//! Mock session helpers for integration tests.
//!
//! Services validate provider-issued access tokens locally. `MockSession` mints a
//! token with the same shape, signed with a test secret, so no identity provider
//! is needed.

use std::time::{SystemTime, UNIX_EPOCH};

use http::{HeaderName, HeaderValue, header};
use uuid::Uuid;

use lifeline_auth_types::cookie::LIFELINE_ACCESS_TOKEN;
use lifeline_auth_types::token::issue_access_token;
use lifeline_domain::id::UserId;

/// Secret shared by mock sessions and the test `AppState`.
pub const TEST_JWT_SECRET: &str = "lifeline-test-jwt-secret";

/// A signed-in user for test requests.
pub struct MockSession {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
}

impl MockSession {
    /// New random user, token valid for one hour.
    pub fn new() -> Self {
        Self::for_user(Uuid::new_v4())
    }

    pub fn for_user(user_id: Uuid) -> Self {
        Self::with_expiry(user_id, now() + 3600)
    }

    /// Token expiring at `exp` (seconds since epoch); pass a past value for expired sessions.
    pub fn with_expiry(user_id: Uuid, exp: u64) -> Self {
        let email = format!("{}@example.com", user_id.simple());
        let access_token = issue_access_token(user_id, Some(&email), TEST_JWT_SECRET, exp)
            .unwrap_or_else(|e| panic!("failed to mint test token: {e}"));
        Self {
            user_id,
            email,
            access_token,
        }
    }

    pub fn user(&self) -> UserId {
        UserId(self.user_id)
    }

    /// `Cookie` header carrying the access token, as a browser would send it.
    pub fn cookie_header(&self) -> (HeaderName, HeaderValue) {
        let value = format!("{LIFELINE_ACCESS_TOKEN}={}", self.access_token);
        (
            header::COOKIE,
            HeaderValue::from_str(&value).unwrap_or_else(|e| panic!("invalid cookie: {e}")),
        )
    }

    /// `Authorization: Bearer` header for API clients.
    pub fn bearer_header(&self) -> (HeaderName, HeaderValue) {
        let value = format!("Bearer {}", self.access_token);
        (
            header::AUTHORIZATION,
            HeaderValue::from_str(&value).unwrap_or_else(|e| panic!("invalid header: {e}")),
        )
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
