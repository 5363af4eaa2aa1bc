#![allow(async_fn_in_trait)]

use lifeline_domain::event::{Event, EventChanges, NewEvent};
use lifeline_domain::id::{EventId, UserId};
use lifeline_domain::photo::PhotoUpload;
use lifeline_domain::user::User;

use crate::domain::types::AuthSession;
use crate::error::TimelineServiceError;

/// Port for the external identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Register a new account. Returns the created user when the provider reports one.
    async fn sign_up(&self, email: &str, password: &str)
    -> Result<Option<User>, TimelineServiceError>;

    async fn sign_in(&self, email: &str, password: &str)
    -> Result<AuthSession, TimelineServiceError>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), TimelineServiceError>;

    /// Look up the user owning `access_token`; `None` when the token is no longer accepted.
    async fn current_user(&self, access_token: &str) -> Result<Option<User>, TimelineServiceError>;

    /// Exchange a refresh token for a new session.
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, TimelineServiceError>;
}

/// Repository for event rows. Every call is scoped to `user_id`.
pub trait EventRepository: Send + Sync {
    /// All events of the user, `event_date` descending.
    async fn list(&self, user_id: UserId) -> Result<Vec<Event>, TimelineServiceError>;

    async fn find(&self, user_id: UserId, id: EventId)
    -> Result<Option<Event>, TimelineServiceError>;

    async fn insert(&self, event: &NewEvent) -> Result<Event, TimelineServiceError>;

    /// Replace the editable fields. Returns `None` if no such row belongs to the user.
    async fn update(
        &self,
        user_id: UserId,
        id: EventId,
        changes: &EventChanges,
    ) -> Result<Option<Event>, TimelineServiceError>;

    /// Delete a row. Returns `true` if deleted, `false` if not found.
    async fn delete(&self, user_id: UserId, id: EventId) -> Result<bool, TimelineServiceError>;
}

/// Blob storage for event photos.
pub trait StorageService: Send + Sync {
    /// Store the photo under the user's namespace and return its public URL.
    async fn upload_photo(
        &self,
        photo: &PhotoUpload,
        user_id: UserId,
    ) -> Result<String, TimelineServiceError>;

    /// Remove the blob a public URL points to.
    async fn delete_photo(&self, url: &str) -> Result<(), TimelineServiceError>;
}
