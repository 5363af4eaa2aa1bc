use lifeline_domain::user::User;
use lifeline_domain::validation::{validate_sign_in, validate_sign_up};

use crate::domain::repository::IdentityProvider;
use crate::domain::types::{AuthSession, SignUpOutcome};
use crate::error::{AuthError, TimelineServiceError};

// ── SignIn ───────────────────────────────────────────────────────────────────

pub struct SignInInput {
    pub email: String,
    pub password: String,
}

pub struct SignInUseCase<I: IdentityProvider> {
    pub identity: I,
}

impl<I: IdentityProvider> SignInUseCase<I> {
    pub async fn execute(&self, input: SignInInput) -> Result<AuthSession, TimelineServiceError> {
        validate_sign_in(&input.email, &input.password)?;
        self.identity
            .sign_in(input.email.trim(), &input.password)
            .await
    }
}

// ── SignUp ───────────────────────────────────────────────────────────────────

pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct SignUpUseCase<I: IdentityProvider> {
    pub identity: I,
}

impl<I: IdentityProvider> SignUpUseCase<I> {
    /// Register, then sign in with the same credentials.
    ///
    /// A refused follow-up sign-in does not fail the sign-up; the caller is told to
    /// sign in manually instead.
    pub async fn execute(&self, input: SignUpInput) -> Result<SignUpOutcome, TimelineServiceError> {
        validate_sign_up(&input.email, &input.password, &input.confirm_password)?;
        let email = input.email.trim();

        let created = self.identity.sign_up(email, &input.password).await?;

        match self.identity.sign_in(email, &input.password).await {
            Ok(session) => Ok(SignUpOutcome::SignedIn(session)),
            Err(e) => {
                tracing::info!(
                    error = %e,
                    user_id = ?created.as_ref().map(|u| u.id),
                    "automatic sign-in after sign-up refused"
                );
                Ok(SignUpOutcome::SignInRequired(created))
            }
        }
    }
}

// ── SignOut ──────────────────────────────────────────────────────────────────

pub struct SignOutUseCase<I: IdentityProvider> {
    pub identity: I,
}

impl<I: IdentityProvider> SignOutUseCase<I> {
    pub async fn execute(&self, access_token: &str) -> Result<(), TimelineServiceError> {
        self.identity.sign_out(access_token).await
    }
}

// ── CurrentUser ──────────────────────────────────────────────────────────────

pub struct CurrentUserUseCase<I: IdentityProvider> {
    pub identity: I,
}

impl<I: IdentityProvider> CurrentUserUseCase<I> {
    /// The provider's view of the user; a revoked session is `Unauthenticated`.
    pub async fn execute(&self, access_token: &str) -> Result<User, TimelineServiceError> {
        self.identity
            .current_user(access_token)
            .await?
            .ok_or_else(|| AuthError::Unauthenticated.into())
    }
}

// ── RefreshSession ───────────────────────────────────────────────────────────

pub struct RefreshSessionUseCase<I: IdentityProvider> {
    pub identity: I,
}

impl<I: IdentityProvider> RefreshSessionUseCase<I> {
    pub async fn execute(
        &self,
        refresh_token: Option<&str>,
    ) -> Result<AuthSession, TimelineServiceError> {
        let refresh_token = refresh_token.ok_or(AuthError::Unauthenticated)?;
        self.identity.refresh(refresh_token).await
    }
}
