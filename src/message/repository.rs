use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::ChatMessage;
use crate::shared::AppError;

/// Trait for the durable append-only chat log, keyed by booking id.
#[async_trait]
pub trait MessageRepository {
    async fn append_message(&self, message: &ChatMessage) -> Result<(), AppError>;

    /// Full history for a booking, ordered by timestamp ascending.
    async fn get_message_history(&self, booking_id: i64) -> Result<Vec<ChatMessage>, AppError>;
}

/// In-memory implementation of MessageRepository for development and testing
pub struct InMemoryMessageRepository {
    messages: Mutex<HashMap<i64, Vec<ChatMessage>>>,
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    #[instrument(skip(self, message))]
    async fn append_message(&self, message: &ChatMessage) -> Result<(), AppError> {
        debug!(
            booking_id = message.booking_id,
            sender_id = message.sender_id,
            "Appending message in memory"
        );

        let mut messages = self.messages.lock().unwrap();
        messages
            .entry(message.booking_id)
            .or_default()
            .push(message.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_message_history(&self, booking_id: i64) -> Result<Vec<ChatMessage>, AppError> {
        debug!(booking_id, "Fetching message history from memory");

        let messages = self.messages.lock().unwrap();
        let mut history = messages.get(&booking_id).cloned().unwrap_or_default();
        history.sort_by_key(|m| m.timestamp);

        Ok(history)
    }
}

/// PostgreSQL implementation of the message store
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    #[instrument(skip(self, message))]
    async fn append_message(&self, message: &ChatMessage) -> Result<(), AppError> {
        debug!(
            booking_id = message.booking_id,
            sender_id = message.sender_id,
            "Appending message in database"
        );

        sqlx::query(
            "INSERT INTO messages (booking_id, sender_id, sender_role, message, timestamp) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(message.booking_id)
        .bind(message.sender_id)
        .bind(message.sender_role.to_string())
        .bind(&message.message)
        .bind(message.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to append message in database");
            AppError::StoreUnavailable(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_message_history(&self, booking_id: i64) -> Result<Vec<ChatMessage>, AppError> {
        debug!(booking_id, "Fetching message history from database");

        sqlx::query_as::<_, ChatMessage>(
            "SELECT booking_id, sender_id, sender_role, message, timestamp \
             FROM messages WHERE booking_id = $1 ORDER BY timestamp ASC",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, booking_id, "Failed to fetch message history from database");
            AppError::StoreUnavailable(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::models::Role;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_append_and_history_ordering() {
        let repo = InMemoryMessageRepository::new();
        let base = Utc::now();

        // Append out of timestamp order
        let mut second = ChatMessage::new(42, 1, Role::Client, "second".to_string());
        second.timestamp = base + Duration::seconds(10);
        let mut first = ChatMessage::new(42, 2, Role::Provider, "first".to_string());
        first.timestamp = base;

        repo.append_message(&second).await.unwrap();
        repo.append_message(&first).await.unwrap();

        let history = repo.get_message_history(42).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message, "first");
        assert_eq!(history[1].message, "second");
    }

    #[tokio::test]
    async fn test_history_is_scoped_per_booking() {
        let repo = InMemoryMessageRepository::new();
        repo.append_message(&ChatMessage::new(1, 1, Role::Client, "a".to_string()))
            .await
            .unwrap();
        repo.append_message(&ChatMessage::new(2, 1, Role::Client, "b".to_string()))
            .await
            .unwrap();

        assert_eq!(repo.get_message_history(1).await.unwrap().len(), 1);
        assert_eq!(repo.get_message_history(2).await.unwrap().len(), 1);
        assert!(repo.get_message_history(3).await.unwrap().is_empty());
    }
}
