use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::AppState;
use crate::{
    session::{ClaimSession, SessionEvent},
    solana::Ledger,
};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Input { text: String },
    Claim,
}

pub async fn ws_handler<L: Ledger>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<L>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws<L: Ledger>(mut socket: WebSocket, state: AppState<L>) {
    let (mut session, mut events) = ClaimSession::new(
        state.caps.clone(),
        state.claim_gate.clone(),
        state.lookup_debounce,
    );
    info!("🔌 claim session opened");

    if send(&mut socket, &SessionEvent::State(session.view())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let Some(Ok(message)) = incoming else { break };
                match message {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::Input { text }) => session.input(text),
                        Ok(ClientMessage::Claim) => {
                            // Completion is reported through the event channel.
                            let _ = session.claim();
                        }
                        Err(err) => warn!(%err, "ignoring malformed session message"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = events.recv() => {
                if send(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    // Dropping the session cancels any pending debounced lookup.
    drop(session);
    info!("claim session closed");
}

async fn send(socket: &mut WebSocket, event: &SessionEvent) -> Result<(), axum::Error> {
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(err) => {
            debug!(%err, "failed to encode session event");
            return Ok(());
        }
    };
    socket.send(Message::Text(payload)).await
}
