//! Collaborators shared by every protocol service.

use std::sync::Arc;

use quilt_core::clock::Clock;
use quilt_core::settings::CollageSettings;
use quilt_core::types::{DbId, Timestamp};
use quilt_db::models::board::Board;
use quilt_db::TileStore;
use quilt_events::{BoardEvent, ChangeNotifier};

use crate::error::{PlacementError, PlacementResult};

/// Store, clock, notifier and settings, cheaply cloneable.
#[derive(Clone)]
pub struct ProtocolContext {
    pub store: Arc<dyn TileStore>,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<ChangeNotifier>,
    pub settings: CollageSettings,
}

impl ProtocolContext {
    pub fn new(
        store: Arc<dyn TileStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<ChangeNotifier>,
        settings: CollageSettings,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            settings,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub(crate) async fn require_board(&self, board_id: DbId) -> PlacementResult<Board> {
        self.store
            .find_board(board_id)
            .await?
            .ok_or(PlacementError::BoardNotFound(board_id))
    }

    /// Drop expired claims on a board before anything trusts claim liveness.
    ///
    /// Announces `locks` when something was actually removed.
    pub(crate) async fn purge_expired(&self, board_id: DbId, now: Timestamp) -> PlacementResult<()> {
        let purged = self.store.purge_expired_claims(board_id, now).await?;
        if purged > 0 {
            tracing::debug!(board_id, purged, "Purged expired claims");
            self.notifier.publish(BoardEvent::locks(board_id));
        }
        Ok(())
    }
}
