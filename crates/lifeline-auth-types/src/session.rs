//! Authenticated session extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use http::request::Parts;
use http::{HeaderMap, StatusCode, header};
use uuid::Uuid;

use crate::cookie::LIFELINE_ACCESS_TOKEN;
use crate::token::validate_access_token;

/// Secret used to verify access-token signatures. Services expose it through
/// `FromRef` so [`Session`] can be extracted from their state.
#[derive(Clone)]
pub struct JwtSecret(Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::from(secret.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtSecret(..)")
    }
}

/// Rejection for [`Session`]: 401 with a `{"kind","message"}` JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("not signed in")]
pub struct Unauthenticated;

impl Unauthenticated {
    pub const KIND: &'static str = "UNAUTHENTICATED";
}

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": Self::KIND,
            "message": self.to_string(),
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// The signed-in user making the request.
///
/// The access token is read from the `lifeline_access_token` cookie, falling back to
/// `Authorization: Bearer`. Rejects with [`Unauthenticated`] when neither is present
/// or the token does not validate. The raw token is kept so row-level-secured upstream calls can be
/// made on the user's behalf.
#[derive(Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub access_token: String,
    pub expires_at: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

fn access_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_cookie = CookieJar::from_headers(headers)
        .get(LIFELINE_ACCESS_TOKEN)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    })
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    JwtSecret: FromRef<S>,
{
    type Rejection = Unauthenticated;

    // Extraction is synchronous; the returned future borrows nothing from `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = JwtSecret::from_ref(state);
        let result = access_token_from_headers(&parts.headers)
            .ok_or(Unauthenticated)
            .and_then(|token| {
                let info = validate_access_token(&token, secret.as_str()).map_err(|e| {
                    tracing::debug!(reason = %e, "rejected access token");
                    Unauthenticated
                })?;
                Ok(Self {
                    user_id: info.user_id,
                    email: info.email,
                    access_token: token,
                    expires_at: info.expires_at,
                })
            });

        async move { result }
    }
}
