use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::{CookieJar, WithRejection};
use serde::{Deserialize, Serialize};

use lifeline_auth_types::{
    cookie::{self, LIFELINE_ACCESS_TOKEN, clear_session_cookies, set_session_cookies},
    session::Session,
};
use lifeline_domain::id::UserId;
use lifeline_domain::user::User;

use crate::domain::types::{AuthSession, SignUpOutcome};
use crate::error::TimelineServiceError;
use crate::state::AppState;
use crate::usecase::auth::{
    CurrentUserUseCase, RefreshSessionUseCase, SignInInput, SignInUseCase, SignOutUseCase,
    SignUpInput, SignUpUseCase,
};

#[derive(Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub signed_in: bool,
    /// Sign-up succeeded but the user has to sign in manually.
    pub sign_in_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
    /// Access-token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl LoginResponse {
    fn signed_in(session: &AuthSession) -> Self {
        Self {
            signed_in: true,
            sign_in_required: false,
            user: Some(session.user.clone().into()),
            expires_in: Some(session.expires_in),
        }
    }

    fn sign_in_required(user: Option<User>) -> Self {
        Self {
            signed_in: false,
            sign_in_required: true,
            user: user.map(UserResponse::from),
            expires_in: None,
        }
    }
}

fn store_session(jar: CookieJar, session: &AuthSession, secure: bool) -> CookieJar {
    set_session_cookies(
        jar,
        session.access_token.clone(),
        session.refresh_token.clone(),
        secure,
    )
}

// ── POST /login ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LoginRequest {
    SignIn {
        email: String,
        password: String,
    },
    SignUp {
        email: String,
        password: String,
        confirm_password: String,
    },
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, TimelineServiceError>,
) -> Result<impl IntoResponse, TimelineServiceError> {
    let session = match body {
        LoginRequest::SignIn { email, password } => {
            let usecase = SignInUseCase {
                identity: state.identity(),
            };
            usecase.execute(SignInInput { email, password }).await?
        }
        LoginRequest::SignUp {
            email,
            password,
            confirm_password,
        } => {
            let usecase = SignUpUseCase {
                identity: state.identity(),
            };
            let outcome = usecase
                .execute(SignUpInput {
                    email,
                    password,
                    confirm_password,
                })
                .await?;
            match outcome {
                SignUpOutcome::SignedIn(session) => session,
                SignUpOutcome::SignInRequired(user) => {
                    return Ok((jar, Json(LoginResponse::sign_in_required(user))));
                }
            }
        }
    };

    tracing::info!(user_id = %session.user.id, "signed in");
    let jar = store_session(jar, &session, state.cookie_secure);
    Ok((jar, Json(LoginResponse::signed_in(&session))))
}

// ── GET /login ───────────────────────────────────────────────────────────────

pub async fn current_user(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<UserResponse>, TimelineServiceError> {
    let usecase = CurrentUserUseCase {
        identity: state.identity(),
    };
    let user = usecase.execute(&session.access_token).await?;
    Ok(Json(user.into()))
}

// ── PATCH /login ─────────────────────────────────────────────────────────────

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, TimelineServiceError> {
    let usecase = RefreshSessionUseCase {
        identity: state.identity(),
    };
    let session = usecase
        .execute(cookie::refresh_token(&jar).as_deref())
        .await?;

    let jar = store_session(jar, &session, state.cookie_secure);
    Ok((jar, Json(LoginResponse::signed_in(&session))))
}

// ── DELETE /login ────────────────────────────────────────────────────────────

/// Revoke the session upstream when one is presented, and always clear the cookies.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let access_token = jar
        .get(LIFELINE_ACCESS_TOKEN)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty());

    if let Some(access_token) = access_token {
        let usecase = SignOutUseCase {
            identity: state.identity(),
        };
        if let Err(e) = usecase.execute(&access_token).await {
            tracing::warn!(error = %e, "upstream sign-out failed; clearing cookies anyway");
        }
    }

    let jar = clear_session_cookies(jar, state.cookie_secure);
    (StatusCode::NO_CONTENT, jar)
}
