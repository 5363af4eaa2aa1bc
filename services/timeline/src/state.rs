use axum::extract::FromRef;

use lifeline_auth_types::session::{JwtSecret, Session};

use crate::infra::auth::SupabaseAuthClient;
use crate::infra::events::{EventBackend, EventStore};
use crate::infra::storage::{PhotoStorage, StorageBackendHandle};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub identity: SupabaseAuthClient,
    pub events: EventBackend,
    pub storage: StorageBackendHandle,
    pub jwt_secret: JwtSecret,
    /// Mark session cookies `Secure`.
    pub cookie_secure: bool,
}

impl AppState {
    pub fn identity(&self) -> SupabaseAuthClient {
        self.identity.clone()
    }

    pub fn event_repo(&self, session: &Session) -> EventStore {
        self.events.for_session(&session.access_token)
    }

    pub fn photo_storage(&self, session: &Session) -> PhotoStorage {
        self.storage.for_session(&session.access_token)
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}
