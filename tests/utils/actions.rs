//! Client-side actions against the coordinator
#![allow(dead_code)]

use uuid::Uuid;

use roomrelay::{room::RoomId, Envelope, MessageType, SessionRequest};

use super::setup::TestSetup;

/// A simulated client: one transport session with one connection id
#[derive(Debug, Clone)]
pub struct Client {
    pub name: String,
    pub session_id: Uuid,
    pub connection_id: Uuid,
    pub owner_id: Uuid,
}

impl Client {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            session_id: Uuid::new_v4(),
            connection_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
        }
    }

    fn request(&self, message_type: MessageType, room_id: RoomId) -> SessionRequest {
        SessionRequest {
            message_type,
            sender_username: self.name.clone(),
            sender_connection_id: Some(self.connection_id),
            owner_id: Some(self.owner_id),
            room_id: Some(room_id),
            categories: vec![],
            multi_user: false,
            content: None,
        }
    }

    pub async fn join(&self, setup: &TestSetup, room_id: RoomId, multi_user: bool) -> Envelope {
        let mut request = self.request(MessageType::Join, room_id);
        request.multi_user = multi_user;
        setup
            .coordinator
            .on_join_request(self.session_id, &request)
            .await
    }

    pub async fn join_category(
        &self,
        setup: &TestSetup,
        room_id: RoomId,
        categories: &[&str],
        multi_user: bool,
    ) -> Envelope {
        let mut request = self.request(MessageType::Join, room_id);
        request.multi_user = multi_user;
        request.categories = categories.iter().map(|c| c.to_string()).collect();
        setup
            .coordinator
            .on_join_request(self.session_id, &request)
            .await
    }

    pub async fn send(&self, setup: &TestSetup, room_id: RoomId, content: &str) -> Envelope {
        let mut request = self.request(MessageType::Message, room_id);
        request.content = Some(content.to_string());
        setup.coordinator.on_message_request(&request).await
    }

    pub async fn ping(&self, setup: &TestSetup, room_id: RoomId) -> Envelope {
        let request = self.request(MessageType::Ping, room_id);
        setup.coordinator.on_message_request(&request).await
    }

    pub async fn disconnect(&self, setup: &TestSetup) -> Envelope {
        setup.coordinator.on_disconnect(&self.session_id).await
    }
}
