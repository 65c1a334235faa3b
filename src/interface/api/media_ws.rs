//! Media stream WebSocket handler
//!
//! The telephony provider opens one connection per call and sends JSON
//! event frames. Frames flow in one direction only; the connection closing
//! is itself a protocol event and triggers finalization when no stop frame
//! arrived first.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use tracing::{debug, info, warn};

use super::metrics_handler::{record_stream_opened, update_active_streams};
use super::voice_handler::AppState;
use crate::application::session_manager::StreamEvent;
use crate::domain::shared::VoiceError;

/// Media stream WebSocket upgrade
pub async fn media_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    info!("media stream connection opened");
    record_stream_opened();

    // The stream this connection is bound to, set by the start frame
    let mut bound: Option<String> = None;

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                warn!("media stream transport error: {}", e);
                break;
            }
        };

        match message {
            Message::Text(text) => {
                match serde_json::from_str::<StreamEvent>(&text) {
                    Ok(event) => {
                        state.sessions.handle_event(&mut bound, event);
                        update_active_streams(state.sessions.active_sessions());
                    }
                    // A bad frame does not kill the connection
                    Err(e) => {
                        let err = VoiceError::Protocol(format!("unparseable stream frame: {}", e));
                        warn!("{}", err);
                    }
                }
            }
            Message::Close(_) => {
                debug!("media stream close frame received");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Binary(_) => debug!("binary media stream frame ignored"),
        }
    }

    state.sessions.handle_disconnect(bound);
    update_active_streams(state.sessions.active_sessions());
    info!("media stream connection closed");
}
