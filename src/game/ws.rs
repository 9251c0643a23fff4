use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use crate::game::messages::{ClientMessage, ServerMessage};
use crate::game::registry::RoomRegistry;
use crate::game::room::{JoinOutcome, RoomCommand, RoomHandle};

/// A connection that has claimed a seat in a room.
struct Seat {
    session_id: String,
    room: RoomHandle,
}

pub async fn handle_connection(socket: WebSocket, registry: Arc<RoomRegistry>) {
    info!("New WebSocket connection");
    let (mut sender, receiver) = socket.split();
    let (tx, mut rx) = broadcast::channel::<ServerMessage>(64);

    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    debug!(?msg, "Sending message to client");
                    let json = serde_json::to_string(&msg).unwrap();
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                // Every room_state broadcast is a full snapshot, so a slow
                // client that misses some catches up with the next one
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Outbound channel lagged, client resyncs on next broadcast");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // The recv task owns the Leave: it fires when the read side of the
    // socket closes, whether or not the send task is still alive.
    let recv_task = tokio::spawn(handle_incoming(receiver, tx, registry));

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!("WebSocket connection closed");
}

async fn handle_incoming(
    mut receiver: futures_util::stream::SplitStream<WebSocket>,
    tx: broadcast::Sender<ServerMessage>,
    registry: Arc<RoomRegistry>,
) {
    let mut seat: Option<Seat> = None;

    while let Some(Ok(msg)) = receiver.next().await {
        let Message::Text(text) = msg else {
            debug!("Received non-text message, ignoring");
            continue;
        };

        debug!(raw = %text, "Received message");

        let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) else {
            warn!(raw = %text, "Failed to parse client message");
            continue;
        };

        if let Some(active) = &seat {
            let delivered = active.room.send(RoomCommand::Message {
                session_id: active.session_id.clone(),
                message: client_msg,
            });
            if !delivered {
                // Room task is gone, nothing more to do on this socket
                warn!(session_id = %active.session_id, "Room disposed, closing connection");
                break;
            }
            continue;
        }

        // First message on a connection must claim a seat
        let ClientMessage::JoinRoom {
            room_code,
            player_name,
            persistent_id,
        } = client_msg
        else {
            debug!("Message before join_room, ignoring");
            continue;
        };

        match join_room(&registry, room_code, player_name, persistent_id, &tx).await {
            Ok(new_seat) => seat = Some(new_seat),
            Err(rejection) => {
                let _ = tx.send(rejection);
                break;
            }
        }
    }

    if let Some(seat) = seat {
        seat.room.send(RoomCommand::Leave {
            session_id: seat.session_id,
        });
    }
}

async fn join_room(
    registry: &Arc<RoomRegistry>,
    room_code: String,
    player_name: String,
    persistent_id: Option<String>,
    tx: &broadcast::Sender<ServerMessage>,
) -> Result<Seat, ServerMessage> {
    let room_code = room_code.trim().to_uppercase();
    let Some(room) = registry.get(&room_code) else {
        info!(room_code, "Join attempt for unknown room");
        return Err(ServerMessage::RoomNotFound);
    };

    let session_id = uuid::Uuid::new_v4().to_string();
    let (reply_tx, reply_rx) = oneshot::channel();
    let delivered = room.send(RoomCommand::Join {
        session_id: session_id.clone(),
        player_name,
        persistent_id,
        tx: tx.clone(),
        reply: reply_tx,
    });
    if !delivered {
        return Err(ServerMessage::RoomNotFound);
    }

    match reply_rx.await {
        Ok(JoinOutcome::Joined { .. }) => Ok(Seat { session_id, room }),
        Ok(JoinOutcome::Rejected { reason }) => {
            info!(room_code, reason, "Join rejected");
            Err(ServerMessage::JoinRejected { reason })
        }
        Err(_) => Err(ServerMessage::RoomNotFound),
    }
}
