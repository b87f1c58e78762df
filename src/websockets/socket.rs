use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::event::EventBus;
use crate::room::RoomId;

use super::session_store::TransportSessionId;

/// Simple WebSocket abstraction - all we care about is send/receive
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text message to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Receive the next message from the client (None if connection closed)
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SocketError>;
}

/// What the connection should do after a client frame was handled
#[derive(Debug, Default)]
pub struct HandlerOutcome {
    /// Sent straight back to this client, never broadcast
    pub reply: Option<String>,
    /// Room topic this connection should start receiving
    pub subscribe_to: Option<RoomId>,
}

/// Handler for incoming WebSocket messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle an incoming message from the client
    async fn handle_message(&self, session_id: TransportSessionId, message: String)
        -> HandlerOutcome;

    /// Called once after the socket has closed
    async fn handle_disconnect(&self, session_id: TransportSessionId);
}

#[derive(Debug)]
pub enum SocketError {
    ConnectionClosed,
    SendFailed(String),
    ReceiveFailed(String),
}

/// Direct implementation on axum's WebSocket
#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(_)) => continue, // Ignore binary/ping/pong
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
                None => return Ok(None), // Connection closed
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// Connection represents a managed WebSocket connection.
/// Room topics it subscribes to are forwarded into its outbound channel.
pub struct Connection {
    pub session_id: TransportSessionId,
    socket: Box<dyn SocketWrapper>,
    outbound_sender: mpsc::UnboundedSender<String>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    message_handler: Arc<dyn MessageHandler>,
    event_bus: EventBus,
    subscriptions: Vec<JoinHandle<()>>,
}

impl Connection {
    pub fn new(
        session_id: TransportSessionId,
        socket: Box<dyn SocketWrapper>,
        message_handler: Arc<dyn MessageHandler>,
        event_bus: EventBus,
    ) -> Self {
        let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel();
        Self {
            session_id,
            socket,
            outbound_sender,
            outbound_receiver,
            message_handler,
            event_bus,
            subscriptions: Vec::new(),
        }
    }

    /// Run the connection - handles both sending and receiving until disconnect.
    /// The handler's disconnect hook runs on every exit path.
    pub async fn run(mut self) -> Result<(), SocketError> {
        let result = self.pump().await;

        // Forwarders must be gone before the disconnect hook runs, otherwise
        // their receivers keep the room topic alive past the prune
        for subscription in self.subscriptions.drain(..) {
            subscription.abort();
            let _ = subscription.await;
        }
        self.message_handler
            .handle_disconnect(self.session_id)
            .await;

        // Clean disconnect
        if result.is_ok() {
            let _ = self.socket.close().await;
        }
        result
    }

    async fn pump(&mut self) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                // Handle outbound messages (room topics and direct replies)
                msg = self.outbound_receiver.recv() => {
                    match msg {
                        Some(message) => self.socket.send_message(message).await?,
                        None => return Err(SocketError::ConnectionClosed),
                    }
                }

                // Handle inbound messages (from client to our app)
                msg = self.socket.receive_message() => {
                    match msg? {
                        Some(message) => {
                            let outcome = self
                                .message_handler
                                .handle_message(self.session_id, message)
                                .await;
                            if let Some(reply) = outcome.reply {
                                self.socket.send_message(reply).await?;
                            }
                            if let Some(room_id) = outcome.subscribe_to {
                                self.subscribe(room_id).await;
                            }
                        }
                        None => return Ok(()), // Client disconnected
                    }
                }
            }
        }
    }

    async fn subscribe(&mut self, room_id: RoomId) {
        let receiver = self.event_bus.subscribe_to_room(&room_id).await;
        let outbound = self.outbound_sender.clone();
        let session_id = self.session_id;

        debug!(session_id = %session_id, room_id = %room_id, "Subscribed to room topic");
        self.subscriptions.push(tokio::spawn(forward_room_topic(
            session_id, room_id, receiver, outbound,
        )));
    }
}

async fn forward_room_topic(
    session_id: TransportSessionId,
    room_id: RoomId,
    mut receiver: broadcast::Receiver<crate::websockets::messages::Envelope>,
    outbound: mpsc::UnboundedSender<String>,
) {
    loop {
        match receiver.recv().await {
            Ok(envelope) => {
                let Ok(json) = serde_json::to_string(&envelope) else {
                    warn!(room_id = %room_id, "Failed to serialize envelope");
                    continue;
                };
                if outbound.send(json).is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(
                    session_id = %session_id,
                    room_id = %room_id,
                    skipped = skipped,
                    "Connection lagging behind room topic"
                );
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
