use sea_orm::DatabaseConnection;

use lifeline_domain::event::{Event, EventChanges, NewEvent};
use lifeline_domain::id::{EventId, UserId};

use crate::domain::repository::EventRepository;
use crate::error::TimelineServiceError;
use crate::infra::db::DbEventRepository;
use crate::infra::postgrest::PostgrestEventRepository;
use crate::infra::supabase::SupabaseProject;

/// Event store chosen at startup (`EVENT_STORE`).
#[derive(Clone)]
pub enum EventBackend {
    Postgrest(SupabaseProject),
    Postgres(DatabaseConnection),
}

impl EventBackend {
    /// Repository acting for the user behind `access_token`.
    pub fn for_session(&self, access_token: &str) -> EventStore {
        match self {
            Self::Postgrest(project) => {
                EventStore::Postgrest(PostgrestEventRepository::new(project.clone(), access_token))
            }
            Self::Postgres(db) => EventStore::Postgres(DbEventRepository { db: db.clone() }),
        }
    }
}

/// Request-scoped event repository.
#[derive(Clone)]
pub enum EventStore {
    Postgrest(PostgrestEventRepository),
    Postgres(DbEventRepository),
}

impl EventRepository for EventStore {
    async fn list(&self, user_id: UserId) -> Result<Vec<Event>, TimelineServiceError> {
        match self {
            Self::Postgrest(repo) => repo.list(user_id).await,
            Self::Postgres(repo) => repo.list(user_id).await,
        }
    }

    async fn find(
        &self,
        user_id: UserId,
        id: EventId,
    ) -> Result<Option<Event>, TimelineServiceError> {
        match self {
            Self::Postgrest(repo) => repo.find(user_id, id).await,
            Self::Postgres(repo) => repo.find(user_id, id).await,
        }
    }

    async fn insert(&self, event: &NewEvent) -> Result<Event, TimelineServiceError> {
        match self {
            Self::Postgrest(repo) => repo.insert(event).await,
            Self::Postgres(repo) => repo.insert(event).await,
        }
    }

    async fn update(
        &self,
        user_id: UserId,
        id: EventId,
        changes: &EventChanges,
    ) -> Result<Option<Event>, TimelineServiceError> {
        match self {
            Self::Postgrest(repo) => repo.update(user_id, id, changes).await,
            Self::Postgres(repo) => repo.update(user_id, id, changes).await,
        }
    }

    async fn delete(&self, user_id: UserId, id: EventId) -> Result<bool, TimelineServiceError> {
        match self {
            Self::Postgrest(repo) => repo.delete(user_id, id).await,
            Self::Postgres(repo) => repo.delete(user_id, id).await,
        }
    }
}
