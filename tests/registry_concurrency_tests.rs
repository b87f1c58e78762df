use std::sync::Arc;

use roomrelay::{InMemoryRoomRegistry, JoinRoomResult, LeaveRoomResult, RoomRegistry};
use uuid::Uuid;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creators_single_winner() {
    let registry = Arc::new(InMemoryRoomRegistry::new());
    let room_id = Uuid::new_v4();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .join(Uuid::new_v4(), Uuid::new_v4(), room_id, vec![], true)
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            JoinRoomResult::Joined { created: true, .. } => created += 1,
            JoinRoomResult::Joined { .. } => {}
            other => panic!("unexpected join result {:?}", other),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(registry.occupancy(&room_id).await, 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_category_joins_share_one_room() {
    let registry = Arc::new(InMemoryRoomRegistry::new());
    let category = vec!["sports".to_string(), "2024".to_string()];

    // Every joiner asks for its own room id; the category should win
    let handles: Vec<_> = (0..32)
        .map(|_| {
            let registry = registry.clone();
            let category = category.clone();
            tokio::spawn(async move {
                let (connection_id, owner_id, room_id) =
                    (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
                registry
                    .join(connection_id, owner_id, room_id, category, true)
                    .await
            })
        })
        .collect();

    let mut rooms = Vec::new();
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_success());
        rooms.push(result.room_id().unwrap());
    }
    rooms.sort();
    rooms.dedup();

    assert_eq!(registry.room_count().await, 1);
    assert_eq!(rooms.len(), 1);
    assert_eq!(registry.occupancy(&rooms[0]).await, 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_joins_admit_once() {
    let registry = Arc::new(InMemoryRoomRegistry::new());
    let room_id = Uuid::new_v4();
    let connection_id = Uuid::new_v4();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .join(connection_id, Uuid::new_v4(), room_id, vec![], false)
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_success() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(registry.occupancy(&room_id).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_join_leave_round_trip_evicts() {
    let registry = Arc::new(InMemoryRoomRegistry::new());
    let room_id = Uuid::new_v4();
    let connections: Vec<Uuid> = (0..24).map(|_| Uuid::new_v4()).collect();

    let joins: Vec<_> = connections
        .iter()
        .map(|&conn| {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .join(conn, Uuid::new_v4(), room_id, vec!["lobby".to_string()], true)
                    .await
            })
        })
        .collect();
    for join in joins {
        assert!(join.await.unwrap().is_success());
    }
    assert_eq!(registry.occupancy(&room_id).await, connections.len());

    let leaves: Vec<_> = connections
        .iter()
        .map(|&conn| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.leave(&conn, &room_id).await })
        })
        .collect();

    let mut deleted = 0;
    for leave in leaves {
        let result = leave.await.unwrap();
        assert!(result.is_success());
        if matches!(result, LeaveRoomResult::RoomDeleted { .. }) {
            deleted += 1;
        }
    }

    // Exactly the last leaver observes the eviction
    assert_eq!(deleted, 1);
    assert!(!registry.exists(&room_id).await);
    assert_eq!(registry.room_count().await, 0);
}
