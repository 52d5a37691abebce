//! Shared harness for protocol integration tests.
//!
//! Wires every service to one `MemoryTileStore`, a `ManualClock` and a
//! `ChangeNotifier`.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use quilt_core::clock::{Clock, ManualClock};
use quilt_core::settings::CollageSettings;
use quilt_core::types::{DbId, Timestamp};
use quilt_db::models::board::Board;
use quilt_db::models::tile::Tile;
use quilt_db::{MemoryTileStore, TileStore};
use quilt_events::ChangeNotifier;
use quilt_placement::{
    BoardAdmin, ClaimGrant, ClaimManager, ClaimRequest, CommitRequest, GridService,
    PlacementCommitter, ProtocolContext, SeedResolver,
};

pub const ADMIN: &str = "admin@example.com";

pub struct Harness {
    pub store: Arc<MemoryTileStore>,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<ChangeNotifier>,
    pub claims: ClaimManager,
    pub committer: PlacementCommitter,
    pub grid: GridService,
    pub seeds: SeedResolver,
    pub admin: BoardAdmin,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryTileStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ));
        let notifier = Arc::new(ChangeNotifier::default());
        let ctx = ProtocolContext::new(
            store.clone() as Arc<dyn TileStore>,
            clock.clone(),
            notifier.clone(),
            CollageSettings::default(),
        );
        Self {
            store,
            clock,
            notifier,
            claims: ClaimManager::new(ctx.clone()),
            committer: PlacementCommitter::new(ctx.clone()),
            grid: GridService::new(ctx.clone()),
            seeds: SeedResolver::new(ctx.clone()),
            admin: BoardAdmin::new(ctx),
        }
    }

    pub fn clock_now(&self) -> Timestamp {
        self.clock.now()
    }

    pub async fn store_tile_count(&self, board_id: DbId) -> i64 {
        self.store.count_tiles(board_id).await.unwrap()
    }

    pub async fn board(&self, size: i32) -> Board {
        self.admin
            .create(Some("Test board"), Some(size), ADMIN)
            .await
            .unwrap()
    }

    /// A board of `size` with its origin tile already committed.
    pub async fn board_with_origin(&self, size: i32) -> (Board, Tile) {
        let board = self.board(size).await;
        let origin = self
            .committer
            .commit(&commit_req(board.id, 0, 0, "founder", None))
            .await
            .unwrap();
        (board, origin)
    }

    pub async fn claim(
        &self,
        board_id: DbId,
        from_tile_id: DbId,
        side: &str,
        user: &str,
    ) -> Result<ClaimGrant, quilt_placement::PlacementError> {
        self.claims
            .claim(&ClaimRequest {
                board_id,
                from_tile_id,
                side: side.to_string(),
                user_id: user.to_string(),
            })
            .await
    }
}

pub fn commit_req(
    board_id: DbId,
    x: i32,
    y: i32,
    user: &str,
    claim_id: Option<DbId>,
) -> CommitRequest {
    CommitRequest {
        board_id,
        x,
        y,
        image_data: format!("data:image/png;base64,{user}-{x}-{y}"),
        user_id: user.to_string(),
        claim_id,
    }
}
