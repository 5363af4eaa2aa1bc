use lifeline_domain::event::{Event, EventChanges, NewEvent};
use lifeline_domain::id::{EventId, UserId};
use lifeline_domain::photo::PhotoUpload;
use lifeline_domain::validation::validate_event_fields;

use crate::domain::repository::{EventRepository, StorageService};
use crate::error::TimelineServiceError;

/// Submitted create/edit form, before validation.
#[derive(Debug, Clone, Default)]
pub struct EventInput {
    pub title: String,
    pub event_date: Option<String>,
    pub description: Option<String>,
    /// Already size- and type-checked by [`PhotoUpload::new`].
    pub photo: Option<PhotoUpload>,
}

// ── ListEvents ───────────────────────────────────────────────────────────────

pub struct ListEventsUseCase<R: EventRepository> {
    pub repo: R,
}

impl<R: EventRepository> ListEventsUseCase<R> {
    pub async fn execute(&self, user_id: UserId) -> Result<Vec<Event>, TimelineServiceError> {
        self.repo.list(user_id).await
    }
}

// ── GetEvent ─────────────────────────────────────────────────────────────────

pub struct GetEventUseCase<R: EventRepository> {
    pub repo: R,
}

impl<R: EventRepository> GetEventUseCase<R> {
    pub async fn execute(&self, user_id: UserId, id: EventId) -> Result<Event, TimelineServiceError> {
        self.repo
            .find(user_id, id)
            .await?
            .ok_or(TimelineServiceError::EventNotFound)
    }
}

// ── CreateEvent ──────────────────────────────────────────────────────────────

pub struct CreateEventUseCase<R: EventRepository, S: StorageService> {
    pub repo: R,
    pub storage: S,
}

impl<R: EventRepository, S: StorageService> CreateEventUseCase<R, S> {
    /// Upload the photo (if any), then insert the row.
    ///
    /// If the insert fails after an upload, the uploaded blob is deleted on a
    /// best-effort basis and the row error is returned.
    pub async fn execute(
        &self,
        user_id: UserId,
        input: EventInput,
    ) -> Result<Event, TimelineServiceError> {
        let fields = validate_event_fields(
            &input.title,
            input.event_date.as_deref(),
            input.description.as_deref(),
        )?;

        let photo_url = match &input.photo {
            Some(photo) => Some(self.storage.upload_photo(photo, user_id).await?),
            None => None,
        };

        let new_event = NewEvent::new(user_id, fields, photo_url);
        match self.repo.insert(&new_event).await {
            Ok(event) => {
                tracing::info!(event_id = %event.id, %user_id, "event created");
                Ok(event)
            }
            Err(err) => {
                if let Some(url) = &new_event.photo_url {
                    if let Err(cleanup) = self.storage.delete_photo(url).await {
                        tracing::warn!(error = %cleanup, %url, "orphaned photo after failed insert");
                    }
                }
                Err(err)
            }
        }
    }
}

// ── UpdateEvent ──────────────────────────────────────────────────────────────

pub struct UpdateEventUseCase<R: EventRepository, S: StorageService> {
    pub repo: R,
    pub storage: S,
}

impl<R: EventRepository, S: StorageService> UpdateEventUseCase<R, S> {
    /// Replace the event's fields. A new photo replaces the old one: the old blob is
    /// deleted first (failure only logged), then the new one is uploaded.
    ///
    /// If the row update fails after an upload, the new blob is deleted on a
    /// best-effort basis. The old blob is already gone by then.
    pub async fn execute(
        &self,
        user_id: UserId,
        id: EventId,
        input: EventInput,
    ) -> Result<Event, TimelineServiceError> {
        let fields = validate_event_fields(
            &input.title,
            input.event_date.as_deref(),
            input.description.as_deref(),
        )?;

        let current = self
            .repo
            .find(user_id, id)
            .await?
            .ok_or(TimelineServiceError::EventNotFound)?;

        let uploaded = match &input.photo {
            Some(photo) => {
                if let Some(old) = &current.photo_url {
                    if let Err(e) = self.storage.delete_photo(old).await {
                        tracing::warn!(error = %e, url = %old, "failed to delete replaced photo");
                    }
                }
                Some(self.storage.upload_photo(photo, user_id).await?)
            }
            None => None,
        };

        let photo_url = uploaded.clone().or(current.photo_url);
        let changes = EventChanges::new(fields, photo_url);
        let result = self
            .repo
            .update(user_id, id, &changes)
            .await
            .and_then(|event| event.ok_or(TimelineServiceError::EventNotFound));

        match result {
            Ok(event) => {
                tracing::info!(event_id = %id, %user_id, "event updated");
                Ok(event)
            }
            Err(err) => {
                if let Some(url) = &uploaded {
                    if let Err(cleanup) = self.storage.delete_photo(url).await {
                        tracing::warn!(error = %cleanup, %url, "orphaned photo after failed update");
                    }
                }
                Err(err)
            }
        }
    }
}

// ── DeleteEvent ──────────────────────────────────────────────────────────────

pub struct DeleteEventUseCase<R: EventRepository, S: StorageService> {
    pub repo: R,
    pub storage: S,
}

impl<R: EventRepository, S: StorageService> DeleteEventUseCase<R, S> {
    /// Delete the photo blob, then the row. A failed blob delete aborts and leaves
    /// the row in place; the two steps are not atomic.
    pub async fn execute(&self, user_id: UserId, id: EventId) -> Result<(), TimelineServiceError> {
        let event = self
            .repo
            .find(user_id, id)
            .await?
            .ok_or(TimelineServiceError::EventNotFound)?;

        if let Some(url) = &event.photo_url {
            self.storage.delete_photo(url).await?;
        }

        if !self.repo.delete(user_id, id).await? {
            return Err(TimelineServiceError::EventNotFound);
        }
        tracing::info!(event_id = %id, %user_id, "event deleted");
        Ok(())
    }
}
