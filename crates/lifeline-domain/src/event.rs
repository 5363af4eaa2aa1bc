//! Timeline event types.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::id::{EventId, UserId};

/// A life milestone recorded by a user, as persisted in the row store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub user_id: UserId,
    pub title: String,
    pub event_date: NaiveDate,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Calendar year the event belongs to on the timeline.
    pub fn year(&self) -> i32 {
        self.event_date.year()
    }
}

/// Validated, user-editable part of an event (what the create and edit forms submit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub title: String,
    pub event_date: NaiveDate,
    pub description: Option<String>,
}

/// Row to insert. `id` and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub user_id: UserId,
    pub title: String,
    pub event_date: NaiveDate,
    pub description: Option<String>,
    pub photo_url: Option<String>,
}

impl NewEvent {
    pub fn new(user_id: UserId, fields: EventFields, photo_url: Option<String>) -> Self {
        Self {
            user_id,
            title: fields.title,
            event_date: fields.event_date,
            description: fields.description,
            photo_url,
        }
    }
}

/// Full-row replacement written by the edit form. `updated_at` is refreshed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventChanges {
    pub title: String,
    pub event_date: NaiveDate,
    pub description: Option<String>,
    pub photo_url: Option<String>,
}

impl EventChanges {
    pub fn new(fields: EventFields, photo_url: Option<String>) -> Self {
        Self {
            title: fields.title,
            event_date: fields.event_date,
            description: fields.description,
            photo_url,
        }
    }
}
