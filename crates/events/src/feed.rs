//! Per-subscriber change feed.
//!
//! A [`BoardFeed`] merges two independent sources: board events from the
//! [`ChangeNotifier`](crate::ChangeNotifier) and a fixed-interval keep-alive
//! tick. The tick keeps idle connections from being timed out by proxies and
//! is never suppressed by event traffic.

use std::time::Duration;

use futures::Stream;
use quilt_core::types::DbId;
use serde_json::json;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::bus::BoardEvent;

/// One item delivered to a feed connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSignal {
    /// First signal on every feed.
    Connected,
    /// A board in scope changed.
    Changed(BoardEvent),
    /// Idle keep-alive.
    KeepAlive,
    /// The subscriber fell behind and `skipped` events were lost; the client
    /// should refetch everything it shows.
    Resync { skipped: u64 },
}

impl FeedSignal {
    /// JSON body carried by this signal on the wire.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            FeedSignal::Connected => json!({ "type": "connected" }),
            FeedSignal::Changed(event) => json!({
                "board_id": event.board_id,
                "reason": event.reason.as_str(),
            }),
            FeedSignal::KeepAlive => json!({}),
            FeedSignal::Resync { skipped } => json!({ "type": "resync", "skipped": skipped }),
        }
    }

    /// Named event type for transports that have one (SSE `event:` line).
    pub fn event_name(&self) -> Option<&'static str> {
        match self {
            FeedSignal::KeepAlive => Some("ping"),
            _ => None,
        }
    }
}

/// A filtered subscription with its own keep-alive clock.
pub struct BoardFeed {
    receiver: broadcast::Receiver<BoardEvent>,
    board_id: Option<DbId>,
    keepalive: Interval,
    greeted: bool,
}

impl BoardFeed {
    pub(crate) fn new(
        receiver: broadcast::Receiver<BoardEvent>,
        board_id: Option<DbId>,
        period: Duration,
    ) -> Self {
        // First tick one full period after connecting, not immediately.
        let mut keepalive = time::interval_at(Instant::now() + period, period);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            receiver,
            board_id,
            keepalive,
            greeted: false,
        }
    }

    /// The board this feed is scoped to, if any.
    pub fn board_id(&self) -> Option<DbId> {
        self.board_id
    }

    /// Wait for the next signal. Returns `None` once the notifier is gone.
    pub async fn next(&mut self) -> Option<FeedSignal> {
        if !self.greeted {
            self.greeted = true;
            return Some(FeedSignal::Connected);
        }

        let scope = self.board_id;
        loop {
            tokio::select! {
                _ = self.keepalive.tick() => return Some(FeedSignal::KeepAlive),
                received = self.receiver.recv() => match received {
                    Ok(event) if scope.map_or(true, |id| id == event.board_id) => {
                        return Some(FeedSignal::Changed(event));
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(board_id = ?scope, skipped, "Change feed lagged");
                        return Some(FeedSignal::Resync { skipped });
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!(board_id = ?scope, "Change notifier closed");
                        return None;
                    }
                },
            }
        }
    }

    /// Adapt the feed into a `Stream` of signals.
    pub fn into_stream(self) -> impl Stream<Item = FeedSignal> + Send {
        futures::stream::unfold(self, |mut feed| async move {
            feed.next().await.map(|signal| (signal, feed))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
