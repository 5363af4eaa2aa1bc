use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel as _, QueryFilter, QueryOrder,
};

use lifeline_domain::event::{Event, EventChanges, NewEvent};
use lifeline_domain::id::{EventId, UserId};
use lifeline_timeline_schema::events;

use crate::domain::repository::EventRepository;
use crate::error::TimelineServiceError;

/// `events` table over a direct Postgres connection.
#[derive(Clone)]
pub struct DbEventRepository {
    pub db: DatabaseConnection,
}

fn row_error(op: &'static str) -> impl FnOnce(DbErr) -> TimelineServiceError {
    move |e| {
        tracing::error!(error = %e, op, "event store query failed");
        TimelineServiceError::Row(format!("{op} failed"))
    }
}

fn event_from_model(model: events::Model) -> Event {
    Event {
        id: EventId(model.id),
        user_id: UserId(model.user_id),
        title: model.title,
        event_date: model.event_date,
        description: model.description,
        photo_url: model.photo_url,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

impl DbEventRepository {
    async fn find_model(
        &self,
        user_id: UserId,
        id: EventId,
    ) -> Result<Option<events::Model>, TimelineServiceError> {
        events::Entity::find_by_id(id.0)
            .filter(events::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await
            .map_err(row_error("find event"))
    }
}

impl EventRepository for DbEventRepository {
    async fn list(&self, user_id: UserId) -> Result<Vec<Event>, TimelineServiceError> {
        let models = events::Entity::find()
            .filter(events::Column::UserId.eq(user_id.0))
            .order_by_desc(events::Column::EventDate)
            .order_by_desc(events::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(row_error("list events"))?;
        Ok(models.into_iter().map(event_from_model).collect())
    }

    async fn find(
        &self,
        user_id: UserId,
        id: EventId,
    ) -> Result<Option<Event>, TimelineServiceError> {
        Ok(self.find_model(user_id, id).await?.map(event_from_model))
    }

    async fn insert(&self, event: &NewEvent) -> Result<Event, TimelineServiceError> {
        let now = Utc::now();
        let model = events::ActiveModel {
            id: Set(EventId::generate().0),
            user_id: Set(event.user_id.0),
            title: Set(event.title.clone()),
            event_date: Set(event.event_date),
            description: Set(event.description.clone()),
            photo_url: Set(event.photo_url.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(row_error("insert event"))?;
        Ok(event_from_model(model))
    }

    async fn update(
        &self,
        user_id: UserId,
        id: EventId,
        changes: &EventChanges,
    ) -> Result<Option<Event>, TimelineServiceError> {
        let Some(model) = self.find_model(user_id, id).await? else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        am.title = Set(changes.title.clone());
        am.event_date = Set(changes.event_date);
        am.description = Set(changes.description.clone());
        am.photo_url = Set(changes.photo_url.clone());
        am.updated_at = Set(Utc::now());
        let model = am.update(&self.db).await.map_err(row_error("update event"))?;
        Ok(Some(event_from_model(model)))
    }

    async fn delete(&self, user_id: UserId, id: EventId) -> Result<bool, TimelineServiceError> {
        let result = events::Entity::delete_many()
            .filter(events::Column::Id.eq(id.0))
            .filter(events::Column::UserId.eq(user_id.0))
            .exec(&self.db)
            .await
            .map_err(row_error("delete event"))?;
        Ok(result.rows_affected > 0)
    }
}
