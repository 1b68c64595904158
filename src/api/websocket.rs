use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;

use crate::error::AppError;
use crate::state::AppState;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (id, mut outbound) = state.connections.register();
    let (mut sink, mut stream) = socket.split();

    // Writer: drains this connection's queue until the peer stops accepting
    // or the connection is unregistered, then completes the close handshake.
    let mut send_task = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                return;
            }
        }
        let _ = sink.close().await;
    });

    // Reader: every text frame is an ingestion attempt.
    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            match msg {
                Message::Text(text) => {
                    ingest_frame(&recv_state, text.as_str()).await;
                }
                Message::Binary(bytes) => {
                    tracing::debug!(connection = id, len = bytes.len(), "ignoring binary frame");
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            state.connections.unregister(id);
        }
        _ = &mut recv_task => {
            // Dropping the registry's sender ends the writer's queue.
            state.connections.unregister(id);
            if tokio::time::timeout(CLOSE_TIMEOUT, &mut send_task).await.is_err() {
                send_task.abort();
            }
        }
    }
}

/// Stores one frame and pushes the stored record to every open connection.
/// Returns the number of connections the record was queued for, or `None`
/// when the frame was dropped.
pub async fn ingest_frame(state: &AppState, frame: &str) -> Option<usize> {
    let record = match state.logs.ingest(frame).await {
        Ok(record) => record,
        Err(AppError::Parse(e)) => {
            tracing::warn!(error = %e, "discarding malformed frame");
            return None;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to store log");
            return None;
        }
    };

    match serde_json::to_string(&record) {
        Ok(json) => Some(state.connections.broadcast(&json)),
        Err(e) => {
            tracing::error!(id = %record.id, error = %e, "failed to serialize log");
            None
        }
    }
}
