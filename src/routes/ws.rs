//! WebSocket upgrade + message loop. Each connection owns one `Session`; each
//! client message is parsed as JSON, applied to it, and answered with one
//! JSON message.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument};

use crate::logic::handle_client_message;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "challenge_studio", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let mut session = state.new_session();
  info!(target: "challenge_studio", session = %session.id(), "WebSocket connected; session opened");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => handle_client_message(&mut session, &state.bank, incoming),
          Err(e) => ServerWsMessage::Error { kind: "bad_request".into(), message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "kind": "internal", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "challenge_studio", session = %session.id(), error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => {
        if let Err(e) = socket.send(Message::Pong(payload)).await {
          error!(target: "challenge_studio", session = %session.id(), error = %e, "WS pong error");
          break;
        }
      }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "challenge_studio", session = %session.id(), challenges = session.challenges().len(), "WebSocket disconnected; session dropped");
}
