use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use lifeline_core::health::health_routes;
use lifeline_core::middleware::{propagate_request_id_layer, request_id_layer};
use lifeline_domain::photo::MAX_PHOTO_BYTES;

use crate::handlers::{
    login::{current_user, login, logout, refresh},
    timeline::{create_event, delete_event, get_event, list_events, update_event},
};
use crate::state::AppState;

/// Room for the text fields and multipart framing on top of the largest photo.
const FORM_BODY_LIMIT: usize = MAX_PHOTO_BYTES + 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Login
        .route(
            "/login",
            post(login).get(current_user).patch(refresh).delete(logout),
        )
        // Timeline
        .route("/timeline", get(list_events))
        .route("/timeline/new", post(create_event))
        .route(
            "/timeline/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .layer(DefaultBodyLimit::max(FORM_BODY_LIMIT))
        .merge(health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
