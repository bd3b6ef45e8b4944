//! Per-connection session plumbing.
//!
//! Each accepted WebSocket runs two cooperating tasks:
//!
//! - the **writer** drains a bounded outbound queue filled by the hub and
//!   sends a protocol ping every 30 seconds (10 second write deadline);
//! - the **reader** forwards raw text frames to the hub and enforces a
//!   60 second idle deadline, reset by any inbound frame.
//!
//! Sessions never touch game state; they move framed bytes. Transport
//! errors, deadlines, and closes all funnel into one `Disconnect` sent to
//! the hub, which folds and detaches the seat.

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use uuid::Uuid;

use card_room::table::{HubMessage, SessionId};

use super::AppState;

/// Outbound queue depth per session.
const OUTBOUND_CAPACITY: usize = 256;

/// Keepalive ping cadence.
const KEEPALIVE_SECS: u64 = 30;

/// Write deadline per frame.
const WRITE_TIMEOUT_SECS: u64 = 10;

/// Reader idle deadline; reset by any inbound frame (pongs included).
const READ_TIMEOUT_SECS: u64 = 60;

/// Upgrade an HTTP request into a table session.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let session: SessionId = Uuid::new_v4();
    let (outbound_tx, outbound_rx) = mpsc::channel::<String>(OUTBOUND_CAPACITY);

    if state
        .hub
        .send(HubMessage::Connect { session, outbound: outbound_tx })
        .await
        .is_err()
    {
        tracing::warn!("session {session}: table is closed, dropping connection");
        return;
    }
    tracing::info!("session {session}: connected");

    let (sender, mut receiver) = socket.split();
    let write_task = tokio::spawn(write_loop(sender, outbound_rx, session));

    // Reader loop. Every inbound frame resets the idle deadline.
    loop {
        match timeout(Duration::from_secs(READ_TIMEOUT_SECS), receiver.next()).await {
            Err(_) => {
                tracing::warn!("session {session}: read deadline exceeded");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(err))) => {
                tracing::debug!("session {session}: transport error: {err}");
                break;
            }
            Ok(Some(Ok(message))) => match message {
                Message::Text(text) => {
                    let frame = text.to_string();
                    if state
                        .hub
                        .send(HubMessage::Inbound { session, frame })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::debug!("session {session}: client closed");
                    break;
                }
                // Pings are answered by the websocket layer; any frame,
                // pongs included, counts as liveness and resets the
                // deadline.
                _ => {}
            },
        }
    }

    write_task.abort();
    let _ = state.hub.send(HubMessage::Disconnect { session }).await;
    tracing::info!("session {session}: disconnected");
}

/// Drain the hub's outbound queue onto the socket, pinging on idle. Exits
/// when the hub drops the queue, a write fails, or a deadline passes.
async fn write_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<String>,
    session: SessionId,
) {
    let mut keepalive = tokio::time::interval(Duration::from_secs(KEEPALIVE_SECS));
    keepalive.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately.
    keepalive.tick().await;

    loop {
        tokio::select! {
            frame = outbound_rx.recv() => match frame {
                Some(json) => {
                    let write = sender.send(Message::Text(json.into()));
                    match timeout(Duration::from_secs(WRITE_TIMEOUT_SECS), write).await {
                        Ok(Ok(())) => {}
                        Ok(Err(err)) => {
                            tracing::debug!("session {session}: write failed: {err}");
                            break;
                        }
                        Err(_) => {
                            tracing::warn!("session {session}: write deadline exceeded");
                            break;
                        }
                    }
                }
                None => {
                    // Hub dropped the session; say goodbye and drain out.
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            },
            _ = keepalive.tick() => {
                let ping = sender.send(Message::Ping(Bytes::new()));
                if timeout(Duration::from_secs(WRITE_TIMEOUT_SECS), ping)
                    .await
                    .map(|r| r.is_err())
                    .unwrap_or(true)
                {
                    tracing::debug!("session {session}: keepalive failed");
                    break;
                }
            }
        }
    }
}
