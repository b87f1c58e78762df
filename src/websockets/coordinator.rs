use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::event::RoomPublisher;
use crate::presence::{DisplayCounts, OffsetReader};
use crate::room::{JoinRoomResult, LeaveRoomResult, LinkedRooms, RoomId, RoomRegistry};
use crate::shared::SessionError;

use super::messages::{Envelope, MessageType, SessionRequest};
use super::session_store::{SessionAttributes, SessionStore, TransportSessionId};

const LINKED_JOIN_NOTICE: &str = "New member in linked room";
const LINKED_LEAVE_NOTICE: &str = "Member left linked room";

/// Session Event Coordinator: turns inbound join, disconnect and message
/// events into registry calls and room broadcasts
pub struct SessionCoordinator {
    registry: Arc<dyn RoomRegistry + Send + Sync>,
    publisher: Arc<dyn RoomPublisher>,
    sessions: Arc<dyn SessionStore>,
    offsets: OffsetReader,
    linked_rooms: LinkedRooms,
}

impl SessionCoordinator {
    pub fn new(
        registry: Arc<dyn RoomRegistry + Send + Sync>,
        publisher: Arc<dyn RoomPublisher>,
        sessions: Arc<dyn SessionStore>,
        offsets: OffsetReader,
        linked_rooms: LinkedRooms,
    ) -> Self {
        Self {
            registry,
            publisher,
            sessions,
            offsets,
            linked_rooms,
        }
    }

    /// Handles a JOIN request. Returns the broadcast envelope on success, or an
    /// error envelope meant for the requester only.
    #[instrument(skip(self, request), fields(room_id = ?request.room_id))]
    pub async fn on_join_request(
        &self,
        session_id: TransportSessionId,
        request: &SessionRequest,
    ) -> Envelope {
        match self.link_session(session_id, request).await {
            Ok(envelope) => {
                info!(session_id = %session_id, "Linking socket session successful");
                envelope
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Linking socket session failed");
                Envelope::error(e.to_string())
            }
        }
    }

    /// Handles the transport's disconnect notification for a session
    #[instrument(skip(self))]
    pub async fn on_disconnect(&self, session_id: &TransportSessionId) -> Envelope {
        match self.unlink_session(session_id).await {
            Ok(envelope) => {
                info!(session_id = %session_id, "Unlinking socket session successful");
                envelope
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Unlinking socket session failed");
                Envelope::error(e.to_string())
            }
        }
    }

    /// Handles MESSAGE and PING requests by relaying them to the room
    #[instrument(skip(self, request), fields(room_id = ?request.room_id))]
    pub async fn on_message_request(&self, request: &SessionRequest) -> Envelope {
        match self.relay_message(request).await {
            Ok(envelope) => {
                info!(message_type = ?envelope.message_type, "Socket message sent successfully");
                envelope
            }
            Err(e) => {
                warn!(error = %e, "Socket message failed");
                Envelope::error(e.to_string())
            }
        }
    }

    async fn link_session(
        &self,
        session_id: TransportSessionId,
        request: &SessionRequest,
    ) -> Result<Envelope, SessionError> {
        if request.message_type != MessageType::Join {
            return Err(SessionError::invalid_message_type("linking socket session"));
        }
        let fields = request.join_fields()?;

        // One room per transport session; disconnect only knows one pair
        if let Some(linked) = self.sessions.get_attributes(&session_id).await {
            return Err(SessionError::SessionAlreadyLinked(linked.room_id));
        }

        let result = self
            .registry
            .join(
                fields.connection_id,
                fields.owner_id,
                fields.room_id,
                fields.categories,
                fields.multi_user,
            )
            .await;

        let (room_id, occupancy) = match result {
            JoinRoomResult::Joined {
                room_id, occupancy, ..
            } => (room_id, occupancy),
            JoinRoomResult::AlreadyMember { room_id } => {
                return Err(SessionError::AlreadyMember(room_id))
            }
            JoinRoomResult::TypeMismatch { room_id } => {
                return Err(SessionError::TypeMismatch(room_id))
            }
        };

        // Disconnect cleanup targets the room actually joined, which differs
        // from the requested one after a category redirect. Frames of one
        // session are handled in order, so nothing raced the check above.
        self.sessions
            .set_attributes(
                session_id,
                SessionAttributes {
                    room_id,
                    connection_id: fields.connection_id,
                },
            )
            .await;

        let counts = self.display_counts(&room_id, occupancy).await;
        let envelope = Envelope::joined(&fields.sender_username, room_id, counts);
        self.publisher.publish(&room_id, &envelope).await;
        self.notify_partner(&room_id, MessageType::Join, LINKED_JOIN_NOTICE, counts)
            .await;

        Ok(envelope)
    }

    async fn unlink_session(
        &self,
        session_id: &TransportSessionId,
    ) -> Result<Envelope, SessionError> {
        let SessionAttributes {
            room_id,
            connection_id,
        } = self
            .sessions
            .take_attributes(session_id)
            .await
            .ok_or(SessionError::MissingSessionState)?;

        let occupancy = match self.registry.leave(&connection_id, &room_id).await {
            LeaveRoomResult::Left { occupancy, .. } => occupancy,
            LeaveRoomResult::RoomDeleted { .. } => 0,
            LeaveRoomResult::NotMember => return Err(SessionError::NotMember(room_id)),
            LeaveRoomResult::RoomNotFound => return Err(SessionError::UnknownRoom(room_id)),
        };

        let counts = self.display_counts(&room_id, occupancy).await;
        let envelope = Envelope::left(room_id, counts);
        self.publisher.publish(&room_id, &envelope).await;
        self.notify_partner(&room_id, MessageType::Leave, LINKED_LEAVE_NOTICE, counts)
            .await;

        if occupancy == 0 {
            self.publisher.prune(&room_id).await;
        }

        Ok(envelope)
    }

    async fn relay_message(&self, request: &SessionRequest) -> Result<Envelope, SessionError> {
        if !matches!(request.message_type, MessageType::Message | MessageType::Ping) {
            return Err(SessionError::invalid_message_type("sending socket message"));
        }
        let fields = request.relay_fields()?;

        if !self.registry.exists(&fields.room_id).await {
            return Err(SessionError::UnknownRoom(fields.room_id));
        }

        let room_id = fields.room_id;
        let envelope = Envelope::relay(fields);
        self.publisher.publish(&room_id, &envelope).await;

        Ok(envelope)
    }

    /// Counts as shown to clients: own occupancy plus the partner's, when the
    /// room declares one, both decorated with the current display offsets
    async fn display_counts(&self, room_id: &RoomId, occupancy: usize) -> DisplayCounts {
        let linked_occupancy = match self.linked_rooms.partner_of(room_id) {
            Some(partner) => Some(self.registry.occupancy(&partner).await),
            None => None,
        };
        DisplayCounts::decorate(occupancy, linked_occupancy, self.offsets.current())
    }

    async fn notify_partner(
        &self,
        room_id: &RoomId,
        message_type: MessageType,
        content: &str,
        counts: DisplayCounts,
    ) {
        if let Some(partner) = self.linked_rooms.partner_of(room_id) {
            let notice = Envelope::linked_notice(message_type, content, *room_id, counts);
            self.publisher.publish(&partner, &notice).await;
        }
    }
}
