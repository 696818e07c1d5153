//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::{ConnectionChannels, ConnectionId};
use crate::util::rate_limit::PlayerRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

type WsSink = futures::stream::SplitSink<WebSocket, Message>;
type WsStream = futures::stream::SplitStream<WebSocket>;

/// WebSocket upgrade handler. Authentication happens in-band via `login`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let connection_id = ConnectionId::new();
    ws.on_upgrade(move |socket| handle_socket(socket, connection_id, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, connection_id: ConnectionId, state: AppState) {
    info!(connection_id = %connection_id, "New WebSocket connection");

    let Some(channels) = state.arena.connect(connection_id).await else {
        error!(connection_id = %connection_id, "Arena unavailable, closing connection");
        return;
    };

    let (ws_sink, ws_stream) = socket.split();
    run_session(connection_id, ws_sink, ws_stream, channels, &state).await;

    // Cleanup on disconnect
    state.arena.disconnect(connection_id).await;

    info!(connection_id = %connection_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    connection_id: ConnectionId,
    ws_sink: WsSink,
    mut ws_stream: WsStream,
    channels: ConnectionChannels,
    state: &AppState,
) {
    let rate_limiter = PlayerRateLimiter::new();

    // Spawn writer task: snapshots and direct replies -> WebSocket
    let writer_handle = tokio::spawn(write_loop(connection_id, ws_sink, channels));

    // Reader loop: WebSocket -> arena
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(connection_id = %connection_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(client_msg) => {
                        if !state.arena.dispatch(connection_id, client_msg).await {
                            debug!(connection_id = %connection_id, "Arena command channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(
                            connection_id = %connection_id,
                            error = %e,
                            "Failed to parse client message"
                        );
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(connection_id = %connection_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(connection_id = %connection_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(connection_id = %connection_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(connection_id = %connection_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Abort writer task
    writer_handle.abort();
}

/// Forward snapshots and replies until the socket or the arena goes away
async fn write_loop(
    connection_id: ConnectionId,
    mut ws_sink: WsSink,
    channels: ConnectionChannels,
) {
    let ConnectionChannels {
        mut reply_rx,
        mut snapshot_rx,
    } = channels;

    loop {
        tokio::select! {
            reply = reply_rx.recv() => {
                let Some(msg) = reply else {
                    debug!(connection_id = %connection_id, "Reply channel closed");
                    break;
                };
                if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                    debug!(connection_id = %connection_id, error = %e, "WebSocket send failed");
                    break;
                }
            }
            snapshot = snapshot_rx.recv() => {
                match snapshot {
                    Ok(text) => {
                        if let Err(e) = ws_sink.send(Message::Text(text.to_string())).await {
                            debug!(
                                connection_id = %connection_id,
                                error = %e,
                                "WebSocket send failed"
                            );
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(
                            connection_id = %connection_id,
                            lagged_count = n,
                            "Client lagged, skipping {} snapshots", n
                        );
                        // Continue - don't disconnect for lag
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!(connection_id = %connection_id, "Snapshot channel closed");
                        break;
                    }
                }
            }
        }
    }
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut WsSink, msg: &ServerMsg) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
