//! Event stream handler: the HTTP host of the stream ingress.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};

use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/notifications/stream
///
/// Registers the caller and streams every notification addressed to them as
/// `data: <json>` events. Rejected with 401 before anything is registered
/// when the token is missing or invalid. Closing the response unregisters
/// the connection.
pub async fn notification_stream(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.realtime.ingress.accept(auth.into_inner());

    let events = subscription
        .into_stream()
        .map(|data| Ok(Event::default().data(&*data)));

    Sse::new(events).keep_alive(
        KeepAlive::new().interval(Duration::from_secs(
            state.config.realtime.keep_alive_seconds.max(1),
        )),
    )
}
