use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use quilt_core::types::DbId;
use quilt_events::FeedSignal;

use crate::handlers::feed::FeedQuery;
use crate::state::AppState;

/// GET /api/v1/ws?board_id=
///
/// Upgrades to a WebSocket that carries the board change feed.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<FeedQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.board_id))
}

/// Frame for one feed signal: keep-alives become protocol pings, the rest
/// JSON text.
fn signal_message(signal: &FeedSignal) -> Message {
    match signal {
        FeedSignal::KeepAlive => Message::Ping(Bytes::new()),
        other => Message::Text(other.payload().to_string().into()),
    }
}

/// Manage a single WebSocket connection after upgrade.
///
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that interleaves feed signals with control
///      messages from the manager (Close at shutdown).
///   3. Drains inbound messages on the current task until the client leaves.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState, board_id: Option<DbId>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let ws_manager = state.ws_manager.clone();

    let mut rx = ws_manager.add(conn_id.clone(), board_id).await;
    let watchers = match board_id {
        Some(id) => ws_manager.board_connection_count(id).await,
        None => ws_manager.connection_count().await,
    };
    tracing::info!(conn_id = %conn_id, ?board_id, watchers, "WebSocket connected");

    let mut feed = state
        .notifier
        .feed(board_id, state.config.collage.feed_keepalive());
    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                control = rx.recv() => match control {
                    Some(msg) => msg,
                    None => break,
                },
                signal = feed.next() => match signal {
                    Some(signal) => signal_message(&signal),
                    None => break,
                },
            };
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            // The feed is one-way.
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
