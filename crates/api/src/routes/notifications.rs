//! Server-sent change notifications.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use futures_util::stream;
use serde::Deserialize;

use super::{ActingUser, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub user_id: Option<String>,
}

/// GET /notifications/events: stream change events to the caller.
///
/// The user comes from `user_id`, falling back to the `x-user-id` header.
/// Each event is one `data: {"type": "..."}` frame; the first one is
/// `connected`. The client is deregistered when the connection closes.
#[tracing::instrument(skip(state))]
pub async fn events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
    ActingUser(header_user): ActingUser,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let user_id = query
        .user_id
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or(header_user);

    let subscription = state.notifications.subscribe(user_id);
    tracing::debug!(client_id = %subscription.client_id(), "Event stream opened");

    let stream = stream::unfold(subscription, |mut subscription| async move {
        let event = subscription.recv().await?;
        Some((Event::default().json_data(event), subscription))
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(state.sse_keep_alive))
}
