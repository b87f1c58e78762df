use roomrelay::{room::RoomLink, MessageType, RoomRegistry, SessionError};
use uuid::Uuid;

mod utils;

use utils::*;

#[tokio::test]
async fn test_join_leave_lifecycle() {
    let setup = TestSetupBuilder::new().build();
    let room = Uuid::new_v4();
    let (alice, bob) = (Client::new("alice"), Client::new("bob"));

    let joined = alice.join(&setup, room, false).await;
    assert_eq!(joined.message_type, MessageType::Join);
    assert_eq!(joined.room_count, Some(1));

    let joined = bob.join(&setup, room, false).await;
    assert_eq!(joined.room_count, Some(2));
    assert_eq!(joined.content, "User bob has joined the chat");

    let left = alice.disconnect(&setup).await;
    assert_eq!(left.message_type, MessageType::Leave);
    assert_eq!(left.room_count, Some(1));
    assert!(setup.registry.exists(&room).await);

    let left = bob.disconnect(&setup).await;
    assert_eq!(left.room_count, Some(0));
    assert!(!setup.registry.exists(&room).await);
    assert!(setup.publisher.was_pruned(&room).await);

    // Every success was broadcast to the room, in order
    let types: Vec<MessageType> = setup
        .publisher
        .get_envelopes_for(&room)
        .await
        .iter()
        .map(|e| e.message_type)
        .collect();
    assert_eq!(
        types,
        vec![
            MessageType::Join,
            MessageType::Join,
            MessageType::Leave,
            MessageType::Leave
        ]
    );
}

#[tokio::test]
async fn test_type_mismatch_join_is_reported_to_requester_only() {
    let setup = TestSetupBuilder::new().build();
    let room = Uuid::new_v4();
    let (alice, bob) = (Client::new("alice"), Client::new("bob"));

    alice.join(&setup, room, false).await;
    setup.publisher.clear_envelopes().await;

    let rejected = bob.join(&setup, room, true).await;

    assert!(rejected.is_error());
    assert_eq!(rejected.content, SessionError::TypeMismatch(room).to_string());
    assert!(setup.publisher.get_envelopes_for(&room).await.is_empty());
    assert_eq!(setup.registry.occupancy(&room).await, 1);

    // Bob never got session state, so the disconnect is a no-op failure
    let disconnect = bob.disconnect(&setup).await;
    assert_eq!(
        disconnect.content,
        SessionError::MissingSessionState.to_string()
    );
    assert_eq!(setup.registry.occupancy(&room).await, 1);
}

#[tokio::test]
async fn test_category_redirect_and_disconnect_cleanup() {
    let setup = TestSetupBuilder::new().build();
    let (r2, r3) = (Uuid::new_v4(), Uuid::new_v4());
    let (alice, bob) = (Client::new("alice"), Client::new("bob"));

    alice.join_category(&setup, r2, &["sports", "2024"], true).await;
    let redirected = bob.join_category(&setup, r3, &["sports", "2024"], true).await;

    assert_eq!(redirected.room_id, Some(r2));
    assert_eq!(redirected.room_count, Some(2));
    assert!(!setup.registry.exists(&r3).await);
    assert!(setup.publisher.get_envelopes_for(&r3).await.is_empty());

    // The session remembers the room the redirect landed in
    let left = bob.disconnect(&setup).await;
    assert_eq!(left.room_id, Some(r2));
    assert_eq!(setup.registry.occupancy(&r2).await, 1);
}

#[tokio::test]
async fn test_messages_and_pings_relay_to_room() {
    let setup = TestSetupBuilder::new().build();
    let room = Uuid::new_v4();
    let alice = Client::new("alice");

    alice.join(&setup, room, true).await;
    setup.publisher.clear_envelopes().await;

    let message = alice.send(&setup, room, "hello room").await;
    let ping = alice.ping(&setup, room).await;

    assert_eq!(message.message_type, MessageType::Message);
    assert_eq!(ping.message_type, MessageType::Ping);

    let delivered = setup.publisher.get_envelopes_for(&room).await;
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].content, "hello room");
    assert_eq!(delivered[0].sender_username, "alice");
    assert_eq!(delivered[1].sender_connection_id, Some(alice.connection_id));
}

#[tokio::test]
async fn test_message_after_room_evicted_fails() {
    let setup = TestSetupBuilder::new().build();
    let room = Uuid::new_v4();
    let alice = Client::new("alice");

    alice.join(&setup, room, true).await;
    alice.disconnect(&setup).await;

    let result = alice.send(&setup, room, "anyone?").await;

    assert!(result.is_error());
    assert_eq!(result.content, SessionError::UnknownRoom(room).to_string());
}

#[tokio::test]
async fn test_display_offsets_and_linked_room() {
    let (game_room, lobby) = (Uuid::new_v4(), Uuid::new_v4());
    let setup = TestSetupBuilder::new()
        .with_offsets(60, 10)
        .with_link(RoomLink {
            room_id: game_room,
            partner: lobby,
        })
        .build();

    for name in ["a", "b", "c"] {
        Client::new(name).join(&setup, lobby, true).await;
    }
    setup.publisher.clear_envelopes().await;

    let player = Client::new("player");
    let joined = player.join(&setup, game_room, false).await;

    assert_eq!(joined.room_count, Some(61));
    assert_eq!(joined.linked_room_count, Some(53));

    let lobby_notices = setup.publisher.get_envelopes_for(&lobby).await;
    assert_eq!(lobby_notices.len(), 1);
    assert_eq!(lobby_notices[0].message_type, MessageType::Join);
    assert_eq!(lobby_notices[0].room_id, Some(game_room));

    let left = player.disconnect(&setup).await;
    assert_eq!(left.room_count, Some(60));
    assert_eq!(setup.publisher.get_envelopes_for(&lobby).await.len(), 2);

    // Raw registry counts are untouched by the offsets
    assert_eq!(setup.registry.occupancy(&lobby).await, 3);
    assert_eq!(setup.registry.occupancy(&game_room).await, 0);
}
