use std::sync::Arc;

use quilt_db::TileStore;
use quilt_events::ChangeNotifier;
use quilt_placement::{
    BoardAdmin, ClaimManager, GridService, PlacementCommitter, ProtocolContext, SeedResolver,
};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the services share one [`ProtocolContext`] behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// The authoritative tile store (PostgreSQL or in-memory).
    pub store: Arc<dyn TileStore>,
    pub notifier: Arc<ChangeNotifier>,
    pub claims: ClaimManager,
    pub committer: PlacementCommitter,
    pub grid: GridService,
    pub seeds: SeedResolver,
    pub admin: BoardAdmin,
    /// WebSocket connection manager (feed clients).
    pub ws_manager: Arc<WsManager>,
    /// Cancelled at shutdown; ends every open change feed.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire every protocol service to `ctx`.
    pub fn new(config: ServerConfig, ctx: ProtocolContext, ws_manager: Arc<WsManager>) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::clone(&ctx.store),
            notifier: Arc::clone(&ctx.notifier),
            claims: ClaimManager::new(ctx.clone()),
            committer: PlacementCommitter::new(ctx.clone()),
            grid: GridService::new(ctx.clone()),
            seeds: SeedResolver::new(ctx.clone()),
            admin: BoardAdmin::new(ctx),
            ws_manager,
            shutdown: CancellationToken::new(),
        }
    }
}
