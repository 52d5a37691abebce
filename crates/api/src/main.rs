use std::net::SocketAddr;
use std::sync::Arc;

use quilt_core::clock::SystemClock;
use quilt_db::{MemoryTileStore, PgTileStore, TileStore};
use quilt_events::ChangeNotifier;
use quilt_placement::ProtocolContext;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quilt_api::config::ServerConfig;
use quilt_api::router::build_app_router;
use quilt_api::state::AppState;
use quilt_api::ws::WsManager;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let (pretty_layer, json_layer) = if json_logs {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "quilt_api=debug,quilt_placement=debug,tower_http=debug".into()
            }),
        )
        .with(pretty_layer)
        .with(json_layer)
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Store ---
    let store: Arc<dyn TileStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = quilt_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            quilt_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            quilt_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgTileStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store (state is lost on exit)");
            Arc::new(MemoryTileStore::new())
        }
    };

    // --- Protocol services ---
    let notifier = Arc::new(ChangeNotifier::default());
    let ctx = ProtocolContext::new(
        store,
        Arc::new(SystemClock),
        notifier,
        config.collage.clone(),
    );
    tracing::info!(
        draw_duration_secs = config.collage.draw_duration_secs,
        renew_interval_secs = config.collage.renew_interval_secs,
        "Claim protocol ready"
    );

    // --- WebSocket manager ---
    let ws_manager = Arc::new(WsManager::new());

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );

    let state = AppState::new(config, ctx, Arc::clone(&ws_manager));
    let shutdown = state.shutdown.clone();
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown, Arc::clone(&ws_manager)))
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM, then end every change feed so the server can
/// drain.
///
/// SSE responses and upgraded sockets never finish on their own, so they
/// are closed here rather than after `serve` returns.
async fn shutdown_signal(shutdown: CancellationToken, ws_manager: Arc<WsManager>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }

    shutdown.cancel();

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;
}
