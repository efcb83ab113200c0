use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::booking::models::Role;

/// Ephemeral participant session, created on join and destroyed on leave or
/// disconnect. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSession {
    pub connection_id: String,
    pub booking_id: i64,
    pub role: Role,
    pub user_id: i64,
}

/// In-memory mapping from booking id to the set of connected participant
/// sessions. A room is derived state: it exists exactly while it has
/// members, and an empty room is simply absent from the map.
pub struct RoomRegistry {
    // booking_id -> connection_id -> session
    rooms: RwLock<HashMap<i64, HashMap<String, RoomSession>>>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Adds the connection to the booking's room. Idempotent: re-joining the
    /// same room with the same connection is a no-op.
    pub async fn join(&self, booking_id: i64, role: Role, user_id: i64, connection_id: &str) {
        let mut rooms = self.rooms.write().await;
        let members = rooms.entry(booking_id).or_default();

        if members.contains_key(connection_id) {
            debug!(booking_id, connection_id, "Connection already in room");
            return;
        }

        members.insert(
            connection_id.to_string(),
            RoomSession {
                connection_id: connection_id.to_string(),
                booking_id,
                role,
                user_id,
            },
        );

        info!(
            booking_id,
            connection_id,
            %role,
            member_count = members.len(),
            "Connection joined room"
        );
    }

    /// Removes the connection from the booking's room. Safe to call for a
    /// connection that is not currently a member.
    pub async fn leave(&self, booking_id: i64, connection_id: &str) {
        let mut rooms = self.rooms.write().await;

        if let Some(members) = rooms.get_mut(&booking_id) {
            if members.remove(connection_id).is_some() {
                info!(
                    booking_id,
                    connection_id,
                    member_count = members.len(),
                    "Connection left room"
                );
            }
            if members.is_empty() {
                rooms.remove(&booking_id);
                debug!(booking_id, "Room is empty, dropping it");
            }
        }
    }

    /// Connection ids of every member of the booking's room.
    pub async fn members_of(&self, booking_id: i64) -> Vec<String> {
        let rooms = self.rooms.read().await;
        rooms
            .get(&booking_id)
            .map(|members| members.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Members of the room excluding one connection (self-echo exclusion).
    pub async fn members_except(&self, booking_id: i64, excluded: &str) -> Vec<String> {
        let rooms = self.rooms.read().await;
        rooms
            .get(&booking_id)
            .map(|members| {
                members
                    .keys()
                    .filter(|id| id.as_str() != excluded)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn is_member(&self, booking_id: i64, connection_id: &str) -> bool {
        let rooms = self.rooms.read().await;
        rooms
            .get(&booking_id)
            .map(|members| members.contains_key(connection_id))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_is_idempotent() {
        let registry = RoomRegistry::new();

        registry.join(42, Role::Client, 1, "conn-a").await;
        registry.join(42, Role::Client, 1, "conn-a").await;

        assert_eq!(registry.members_of(42).await, vec!["conn-a".to_string()]);
    }

    #[tokio::test]
    async fn test_leave_non_member_is_a_noop() {
        let registry = RoomRegistry::new();

        registry.join(42, Role::Client, 1, "conn-a").await;
        registry.leave(42, "conn-b").await;
        registry.leave(99, "conn-a").await;

        assert!(registry.is_member(42, "conn-a").await);
    }

    #[tokio::test]
    async fn test_empty_room_is_absent() {
        let registry = RoomRegistry::new();

        registry.join(42, Role::Provider, 2, "conn-a").await;
        registry.leave(42, "conn-a").await;

        assert!(registry.members_of(42).await.is_empty());
        assert!(registry.rooms.read().await.get(&42).is_none());
    }

    #[tokio::test]
    async fn test_members_except_excludes_the_sender() {
        let registry = RoomRegistry::new();

        registry.join(42, Role::Client, 1, "conn-a").await;
        registry.join(42, Role::Provider, 2, "conn-b").await;

        let others = registry.members_except(42, "conn-a").await;
        assert_eq!(others, vec!["conn-b".to_string()]);
    }
}
