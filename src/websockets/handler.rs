use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::shared::{AppState, SessionError};

use super::coordinator::SessionCoordinator;
use super::messages::{Envelope, MessageType, SessionRequest};
use super::session_store::TransportSessionId;
use super::socket::{Connection, HandlerOutcome, MessageHandler};

/// Routes client frames to the session coordinator
pub struct WebsocketReceiveHandler {
    coordinator: Arc<SessionCoordinator>,
}

impl WebsocketReceiveHandler {
    pub fn new(coordinator: Arc<SessionCoordinator>) -> Self {
        Self { coordinator }
    }

    fn reply(envelope: &Envelope) -> Option<String> {
        match serde_json::to_string(envelope) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "Failed to serialize reply envelope");
                None
            }
        }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, session_id: TransportSessionId, message: String) -> HandlerOutcome {
        debug!(session_id = %session_id, message = %message, "Received message");

        let request = match serde_json::from_str::<SessionRequest>(&message) {
            Ok(request) => request,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Failed to parse WebSocket message");
                let error = SessionError::MalformedRequest(e.to_string());
                return HandlerOutcome {
                    reply: Self::reply(&Envelope::error(error.to_string())),
                    subscribe_to: None,
                };
            }
        };

        match request.message_type {
            MessageType::Join => {
                let envelope = self.coordinator.on_join_request(session_id, &request).await;
                // The joiner subscribes after the broadcast went out, so it gets
                // its own join announcement as the reply
                let subscribe_to = if envelope.is_error() {
                    None
                } else {
                    envelope.room_id
                };
                HandlerOutcome {
                    reply: Self::reply(&envelope),
                    subscribe_to,
                }
            }
            MessageType::Message | MessageType::Ping => {
                let envelope = self.coordinator.on_message_request(&request).await;
                // Successful relays reach the sender through the room topic
                HandlerOutcome {
                    reply: envelope.is_error().then(|| Self::reply(&envelope)).flatten(),
                    subscribe_to: None,
                }
            }
            other => {
                debug!(message_type = ?other, "Unhandled message type");
                let error = SessionError::MalformedRequest(format!(
                    "Unsupported message type {:?}",
                    other
                ));
                HandlerOutcome {
                    reply: Self::reply(&Envelope::error(error.to_string())),
                    subscribe_to: None,
                }
            }
        }
    }

    async fn handle_disconnect(&self, session_id: TransportSessionId) {
        let envelope = self.coordinator.on_disconnect(&session_id).await;
        debug!(
            session_id = %session_id,
            message_type = ?envelope.message_type,
            "Disconnect processed"
        );
    }
}

/// WebSocket endpoint
/// GET /ws
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    info!("WebSocket connection requested");
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let session_id = Uuid::new_v4();
    info!(session_id = %session_id, "WebSocket connection established");

    let message_handler = Arc::new(WebsocketReceiveHandler::new(app_state.coordinator.clone()));
    let connection = Connection::new(
        session_id,
        Box::new(socket),
        message_handler,
        app_state.event_bus.clone(),
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(session_id = %session_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(session_id = %session_id, error = ?e, "WebSocket connection error");
        }
    }
}
