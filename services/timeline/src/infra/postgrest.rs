use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use lifeline_domain::event::{Event, EventChanges, NewEvent};
use lifeline_domain::id::{EventId, UserId};

use crate::domain::repository::EventRepository;
use crate::error::TimelineServiceError;
use crate::infra::supabase::{SupabaseProject, UpstreamError};

const EVENTS_PATH: &str = "rest/v1/events";

/// `events` table through the project's REST interface.
///
/// Calls carry the signed-in user's access token, so row-level security applies on
/// top of the explicit `user_id` filter.
#[derive(Clone)]
pub struct PostgrestEventRepository {
    pub project: SupabaseProject,
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
struct EventRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    event_date: NaiveDate,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: EventId(row.id),
            user_id: UserId(row.user_id),
            title: row.title,
            event_date: row.event_date,
            description: row.description,
            photo_url: row.photo_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Serialize)]
struct InsertBody<'a> {
    user_id: Uuid,
    title: &'a str,
    event_date: NaiveDate,
    description: Option<&'a str>,
    photo_url: Option<&'a str>,
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    title: &'a str,
    event_date: NaiveDate,
    description: Option<&'a str>,
    photo_url: Option<&'a str>,
    updated_at: DateTime<Utc>,
}

fn row_error(e: impl std::fmt::Display) -> TimelineServiceError {
    TimelineServiceError::Row(e.to_string())
}

impl PostgrestEventRepository {
    pub fn new(project: SupabaseProject, access_token: impl Into<String>) -> Self {
        Self {
            project,
            access_token: access_token.into(),
        }
    }

    /// `rest/v1/events` with `user_id=eq.{user}` plus any extra filters.
    fn events_url(&self, user_id: UserId, filters: &[(&str, String)]) -> Result<Url, TimelineServiceError> {
        let mut url = self
            .project
            .endpoint(EVENTS_PATH)
            .map_err(|e| TimelineServiceError::Internal(e.into()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("user_id", &format!("eq.{user_id}"));
            for (key, value) in filters {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.project.request(method, url, &self.access_token)
    }

    async fn rows(response: Response) -> Result<Vec<Event>, TimelineServiceError> {
        if !response.status().is_success() {
            return Err(row_error(UpstreamError::from_response(response).await));
        }
        let rows: Vec<EventRow> = response.json().await.map_err(row_error)?;
        Ok(rows.into_iter().map(Event::from).collect())
    }
}

impl EventRepository for PostgrestEventRepository {
    async fn list(&self, user_id: UserId) -> Result<Vec<Event>, TimelineServiceError> {
        let url = self.events_url(
            user_id,
            &[
                ("select", "*".to_owned()),
                ("order", "event_date.desc".to_owned()),
            ],
        )?;
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(row_error)?;
        Self::rows(response).await
    }

    async fn find(
        &self,
        user_id: UserId,
        id: EventId,
    ) -> Result<Option<Event>, TimelineServiceError> {
        let url = self.events_url(
            user_id,
            &[("select", "*".to_owned()), ("id", format!("eq.{id}"))],
        )?;
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(row_error)?;
        Ok(Self::rows(response).await?.into_iter().next())
    }

    async fn insert(&self, event: &NewEvent) -> Result<Event, TimelineServiceError> {
        let mut url = self
            .project
            .endpoint(EVENTS_PATH)
            .map_err(|e| TimelineServiceError::Internal(e.into()))?;
        url.query_pairs_mut().append_pair("select", "*");
        let body = InsertBody {
            user_id: event.user_id.0,
            title: &event.title,
            event_date: event.event_date,
            description: event.description.as_deref(),
            photo_url: event.photo_url.as_deref(),
        };
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await
            .map_err(row_error)?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| row_error("insert returned no row"))
    }

    async fn update(
        &self,
        user_id: UserId,
        id: EventId,
        changes: &EventChanges,
    ) -> Result<Option<Event>, TimelineServiceError> {
        let url = self.events_url(
            user_id,
            &[("select", "*".to_owned()), ("id", format!("eq.{id}"))],
        )?;
        let body = UpdateBody {
            title: &changes.title,
            event_date: changes.event_date,
            description: changes.description.as_deref(),
            photo_url: changes.photo_url.as_deref(),
            updated_at: Utc::now(),
        };
        let response = self
            .request(Method::PATCH, url)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await
            .map_err(row_error)?;
        Ok(Self::rows(response).await?.into_iter().next())
    }

    async fn delete(&self, user_id: UserId, id: EventId) -> Result<bool, TimelineServiceError> {
        let url = self.events_url(
            user_id,
            &[("select", "id".to_owned()), ("id", format!("eq.{id}"))],
        )?;
        let response = self
            .request(Method::DELETE, url)
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(row_error)?;
        if !response.status().is_success() {
            return Err(row_error(UpstreamError::from_response(response).await));
        }
        let deleted: Vec<serde_json::Value> = response.json().await.map_err(row_error)?;
        Ok(!deleted.is_empty())
    }
}
