//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ChangeNotifier`] is shared via `Arc<ChangeNotifier>` by the protocol
//! services (publishers) and the feed endpoints (subscribers).

use std::time::Duration;

use quilt_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::feed::BoardFeed;

// ---------------------------------------------------------------------------
// BoardEvent
// ---------------------------------------------------------------------------

/// What changed on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeReason {
    /// A tile was committed (or tiles were seeded/replaced).
    Tiles,
    /// The set of live claims changed.
    Locks,
}

impl ChangeReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeReason::Tiles => "tiles",
            ChangeReason::Locks => "locks",
        }
    }
}

/// "This board changed" signal. Serialized as `{"board_id":..,"reason":..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEvent {
    pub board_id: DbId,
    pub reason: ChangeReason,
}

impl BoardEvent {
    pub fn tiles(board_id: DbId) -> Self {
        Self {
            board_id,
            reason: ChangeReason::Tiles,
        }
    }

    pub fn locks(board_id: DbId) -> Self {
        Self {
            board_id,
            reason: ChangeReason::Locks,
        }
    }
}

// ---------------------------------------------------------------------------
// ChangeNotifier
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Process-wide fan-out of [`BoardEvent`]s.
///
/// Delivery is best-effort: publishing with no subscribers drops the event,
/// and a subscriber that falls more than the channel capacity behind loses
/// the oldest events (observed as a resync on its [`BoardFeed`]).
pub struct ChangeNotifier {
    sender: broadcast::Sender<BoardEvent>,
}

impl ChangeNotifier {
    /// Create a notifier with a specific channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: BoardEvent) {
        // SendError only means there are zero receivers.
        let receivers = self.sender.send(event).unwrap_or(0);
        tracing::trace!(
            board_id = event.board_id,
            reason = event.reason.as_str(),
            receivers,
            "Board change published"
        );
    }

    /// Raw subscription to every board's events.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.sender.subscribe()
    }

    /// Open a feed for one board (or all boards when `board_id` is `None`)
    /// that also yields a keep-alive every `keepalive`.
    pub fn feed(&self, board_id: Option<DbId>, keepalive: Duration) -> BoardFeed {
        BoardFeed::new(self.subscribe(), board_id, keepalive)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
