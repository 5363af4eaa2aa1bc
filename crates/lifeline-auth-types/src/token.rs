//! Access-token validation.
//!
//! Access tokens are issued by the identity provider (GoTrue-compatible), signed
//! HS256 with the project's JWT secret and addressed to the `authenticated`
//! audience. Lifeline never issues production tokens; it only validates them.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_TESTING", test))]
use serde::Serialize;
use uuid::Uuid;

/// Audience claim carried by tokens of signed-in users.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub expires_at: u64,
}

/// Errors returned by [`validate_access_token`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("wrong audience")]
    WrongAudience,
    #[error("malformed token")]
    Malformed,
}

/// Claims read from a provider access token.
///
/// | Field   | Meaning                                   |
/// |---------|-------------------------------------------|
/// | `sub`   | user id (UUID string)                     |
/// | `email` | user email, absent for phone-only users   |
/// | `exp`   | expiration, seconds since UNIX epoch      |
/// | `aud`   | `"authenticated"` (string or array)       |
///
/// [`Serialize`] is only derived with the **`USE_ONLY_IN_TESTING`** feature, which
/// test helpers enable to mint tokens.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_TESTING", test), derive(Serialize))]
pub struct AccessClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
}

fn decode_jwt(token: &str, secret: &str) -> Result<AccessClaims, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_audience(&[AUTHENTICATED_AUDIENCE]);
    validation.set_required_spec_claims(&["exp", "sub", "aud"]);

    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidAudience => TokenError::WrongAudience,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate an access token from the session cookie or `Authorization` header.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, TokenError> {
    let claims = decode_jwt(token, secret)?;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    Ok(TokenInfo {
        user_id,
        email: claims.email,
        expires_at: claims.exp,
    })
}

/// Mint an HS256 access token shaped like the provider's.
///
/// Requires the `USE_ONLY_IN_TESTING` feature.
#[cfg(any(feature = "USE_ONLY_IN_TESTING", test))]
pub fn issue_access_token(
    user_id: Uuid,
    email: Option<&str>,
    secret: &str,
    exp: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = AccessClaims {
        sub: user_id.to_string(),
        email: email.map(str::to_owned),
        exp,
        aud: Some(serde_json::Value::from(AUTHENTICATED_AUDIENCE)),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
}
