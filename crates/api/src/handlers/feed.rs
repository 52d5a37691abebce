//! Server-sent change feed.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use futures::{Stream, StreamExt};
use quilt_core::types::DbId;
use quilt_events::FeedSignal;
use serde::Deserialize;

use crate::state::AppState;

/// Feed scope shared by the SSE and WebSocket endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    /// Only events for this board; every board when absent.
    pub board_id: Option<DbId>,
}

/// GET /api/v1/boards/stream?board_id=
///
/// `connected` first, one message per change, `ping` events while idle and
/// `resync` after lost events. Signals are hints; clients refetch state.
pub async fn stream(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let feed = state
        .notifier
        .feed(query.board_id, state.config.collage.feed_keepalive());
    tracing::debug!(
        board_id = ?query.board_id,
        subscribers = state.notifier.subscriber_count(),
        "SSE feed subscribed",
    );
    Sse::new(
        feed.into_stream()
            .take_until(state.shutdown.cancelled_owned())
            .map(|signal| Ok(sse_event(&signal))),
    )
}

fn sse_event(signal: &FeedSignal) -> Event {
    let event = Event::default().data(signal.payload().to_string());
    match signal.event_name() {
        Some(name) => event.event(name),
        None => event,
    }
}
