use lifeline_domain::user::User;

/// Tokens returned by the identity provider after a successful sign-in or refresh.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds.
    pub expires_in: u64,
    pub user: User,
}

/// Result of a sign-up attempt.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Account created and signed in.
    SignedIn(AuthSession),
    /// Account created, but the automatic sign-in was refused (e.g. email confirmation
    /// pending). The user must sign in manually. Carries the new account when the
    /// provider reported it.
    SignInRequired(Option<User>),
}
