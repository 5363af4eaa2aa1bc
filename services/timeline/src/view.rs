//! Response view models for the timeline screens.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use lifeline_core::serde::to_rfc3339_ms;
use lifeline_domain::date::{format_long, format_short};
use lifeline_domain::event::Event;
use lifeline_domain::id::EventId;
use lifeline_domain::timeline::group_by_year_desc;

/// `GET /timeline`: events grouped by year, newest year first.
#[derive(Debug, Serialize)]
pub struct TimelineView {
    pub total: usize,
    pub years: Vec<YearSection>,
}

#[derive(Debug, Serialize)]
pub struct YearSection {
    pub year: i32,
    pub label: String,
    pub events: Vec<TimelineEntry>,
}

#[derive(Debug, Serialize)]
pub struct TimelineEntry {
    pub id: EventId,
    pub title: String,
    pub event_date: NaiveDate,
    /// `YYYY.MM.DD`
    pub date_label: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
}

impl From<Event> for TimelineEntry {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            date_label: format_short(event.event_date),
            title: event.title,
            event_date: event.event_date,
            description: event.description,
            photo_url: event.photo_url,
        }
    }
}

impl TimelineView {
    /// Groups events already ordered by the store; order within a year is kept.
    pub fn from_events(events: Vec<Event>) -> Self {
        let total = events.len();
        let years = group_by_year_desc(events)
            .into_iter()
            .map(|group| YearSection {
                year: group.year,
                label: format!("{} 年", group.year),
                events: group.events.into_iter().map(TimelineEntry::from).collect(),
            })
            .collect();
        Self { total, years }
    }
}

/// `GET /timeline/{id}` and mutation responses.
#[derive(Debug, Serialize)]
pub struct EventDetailView {
    pub id: EventId,
    pub title: String,
    pub event_date: NaiveDate,
    /// `YYYY年M月D日`
    pub date_label: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventDetailView {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            date_label: format_long(event.event_date),
            title: event.title,
            event_date: event.event_date,
            description: event.description,
            photo_url: event.photo_url,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}
