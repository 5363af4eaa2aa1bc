use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lifeline_domain::id::UserId;
use lifeline_domain::user::User;

use crate::domain::repository::IdentityProvider;
use crate::domain::types::AuthSession;
use crate::error::{AuthError, TimelineServiceError};
use crate::infra::supabase::{SupabaseProject, UpstreamError};

/// GoTrue-compatible identity provider at `{project}/auth/v1`.
#[derive(Clone)]
pub struct SupabaseAuthClient {
    pub project: SupabaseProject,
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        User {
            id: UserId(dto.id),
            email: dto.email.filter(|e| !e.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    user: UserDto,
}

impl From<TokenResponse> for AuthSession {
    fn from(body: TokenResponse) -> Self {
        AuthSession {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            expires_in: body.expires_in,
            user: body.user.into(),
        }
    }
}

/// Sign-up answers with a session when email confirmation is off, and with the bare
/// user object when it is on.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session { user: UserDto },
    User(UserDto),
}

fn transport(e: reqwest::Error) -> TimelineServiceError {
    AuthError::Provider(e.to_string()).into()
}

fn provider(err: UpstreamError) -> TimelineServiceError {
    AuthError::Provider(err.to_string()).into()
}

impl SupabaseAuthClient {
    pub fn new(project: SupabaseProject) -> Self {
        Self { project }
    }

    fn token_url(&self, grant_type: &str) -> Result<url::Url, TimelineServiceError> {
        let mut url = self
            .project
            .endpoint("auth/v1/token")
            .map_err(|e| TimelineServiceError::Internal(e.into()))?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        Ok(url)
    }

    fn url(&self, path: &str) -> Result<url::Url, TimelineServiceError> {
        self.project
            .endpoint(path)
            .map_err(|e| TimelineServiceError::Internal(e.into()))
    }
}

impl IdentityProvider for SupabaseAuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, TimelineServiceError> {
        let response = self
            .project
            .anon_request(Method::POST, self.url("auth/v1/signup")?)
            .json(&PasswordCredentials { email, password })
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            let err = UpstreamError::from_response(response).await;
            let code = err.code.clone();
            return Err(match code.as_deref() {
                Some("user_already_exists" | "email_exists") => {
                    AuthError::EmailAlreadyRegistered.into()
                }
                Some("weak_password") => AuthError::WeakPassword(err.message).into(),
                _ if err.message.contains("already registered") => {
                    AuthError::EmailAlreadyRegistered.into()
                }
                _ => provider(err),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        let user = match serde_json::from_slice::<SignUpResponse>(&body) {
            Ok(SignUpResponse::Session { user } | SignUpResponse::User(user)) => Some(user.into()),
            Err(e) => {
                tracing::debug!(error = %e, "sign-up response carried no user");
                None
            }
        };
        Ok(user)
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, TimelineServiceError> {
        let response = self
            .project
            .anon_request(Method::POST, self.token_url("password")?)
            .json(&PasswordCredentials { email, password })
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            let err = UpstreamError::from_response(response).await;
            let status = err.status;
            return Err(match status {
                _ if err.has_code("email_not_confirmed") => AuthError::EmailNotConfirmed.into(),
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                    AuthError::InvalidCredentials.into()
                }
                _ => provider(err),
            });
        }

        let body: TokenResponse = response.json().await.map_err(transport)?;
        Ok(body.into())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), TimelineServiceError> {
        let response = self
            .project
            .request(Method::POST, self.url("auth/v1/logout")?, access_token)
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            s if s.is_success() => Ok(()),
            // Session already gone on the provider side.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(provider(UpstreamError::from_response(response).await)),
        }
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<User>, TimelineServiceError> {
        let response = self
            .project
            .request(Method::GET, self.url("auth/v1/user")?, access_token)
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            s if s.is_success() => {
                let user: UserDto = response.json().await.map_err(transport)?;
                Ok(Some(user.into()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            _ => Err(provider(UpstreamError::from_response(response).await)),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, TimelineServiceError> {
        let response = self
            .project
            .anon_request(Method::POST, self.token_url("refresh_token")?)
            .json(&RefreshGrant { refresh_token })
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            let err = UpstreamError::from_response(response).await;
            let status = err.status;
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                    AuthError::Unauthenticated.into()
                }
                _ => provider(err),
            });
        }

        let body: TokenResponse = response.json().await.map_err(transport)?;
        Ok(body.into())
    }
}
