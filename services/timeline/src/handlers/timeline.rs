use std::future::Future;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use lifeline_auth_types::session::Session;
use lifeline_domain::id::{EventId, UserId};

use crate::error::TimelineServiceError;
use crate::handlers::form::read_event_form;
use crate::state::AppState;
use crate::usecase::event::{
    CreateEventUseCase, DeleteEventUseCase, GetEventUseCase, ListEventsUseCase,
    UpdateEventUseCase,
};
use crate::view::{EventDetailView, TimelineView};

/// Run a multi-step mutation on its own task so a dropped connection cannot stop
/// it between the blob and row steps.
async fn run_detached<F, T>(task: F) -> Result<T, TimelineServiceError>
where
    F: Future<Output = Result<T, TimelineServiceError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(task)
        .await
        .map_err(|e| TimelineServiceError::Internal(anyhow::anyhow!("mutation task failed: {e}")))?
}

// ── GET /timeline ────────────────────────────────────────────────────────────

pub async fn list_events(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<TimelineView>, TimelineServiceError> {
    let usecase = ListEventsUseCase {
        repo: state.event_repo(&session),
    };
    let events = usecase.execute(UserId(session.user_id)).await?;
    Ok(Json(TimelineView::from_events(events)))
}

// ── POST /timeline/new ───────────────────────────────────────────────────────

pub async fn create_event(
    State(state): State<AppState>,
    session: Session,
    WithRejection(multipart, _): WithRejection<Multipart, TimelineServiceError>,
) -> Result<impl IntoResponse, TimelineServiceError> {
    let input = read_event_form(multipart).await?;
    let usecase = CreateEventUseCase {
        repo: state.event_repo(&session),
        storage: state.photo_storage(&session),
    };
    let user_id = UserId(session.user_id);
    let event = run_detached(async move { usecase.execute(user_id, input).await }).await?;
    Ok((StatusCode::CREATED, Json(EventDetailView::from(event))))
}

// ── GET /timeline/{id} ───────────────────────────────────────────────────────

pub async fn get_event(
    State(state): State<AppState>,
    session: Session,
    WithRejection(Path(id), _): WithRejection<Path<EventId>, TimelineServiceError>,
) -> Result<Json<EventDetailView>, TimelineServiceError> {
    let usecase = GetEventUseCase {
        repo: state.event_repo(&session),
    };
    let event = usecase.execute(UserId(session.user_id), id).await?;
    Ok(Json(event.into()))
}

// ── PUT /timeline/{id} ───────────────────────────────────────────────────────

pub async fn update_event(
    State(state): State<AppState>,
    session: Session,
    WithRejection(Path(id), _): WithRejection<Path<EventId>, TimelineServiceError>,
    WithRejection(multipart, _): WithRejection<Multipart, TimelineServiceError>,
) -> Result<Json<EventDetailView>, TimelineServiceError> {
    let input = read_event_form(multipart).await?;
    let usecase = UpdateEventUseCase {
        repo: state.event_repo(&session),
        storage: state.photo_storage(&session),
    };
    let user_id = UserId(session.user_id);
    let event = run_detached(async move { usecase.execute(user_id, id, input).await }).await?;
    Ok(Json(event.into()))
}

// ── DELETE /timeline/{id} ────────────────────────────────────────────────────

pub async fn delete_event(
    State(state): State<AppState>,
    session: Session,
    WithRejection(Path(id), _): WithRejection<Path<EventId>, TimelineServiceError>,
) -> Result<StatusCode, TimelineServiceError> {
    let usecase = DeleteEventUseCase {
        repo: state.event_repo(&session),
        storage: state.photo_storage(&session),
    };
    let user_id = UserId(session.user_id);
    run_detached(async move { usecase.execute(user_id, id).await }).await?;
    Ok(StatusCode::NO_CONTENT)
}
