//! Test assertion helpers - fluent API for verifying outbound events
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Everything a connection has been sent so far, parsed off the wire.
pub struct EventLog {
    connection_id: String,
    events: Vec<Value>,
}

impl EventLog {
    pub async fn for_connection(setup: &TestSetup, connection_id: &str) -> Self {
        let events = setup
            .mock_conn_manager
            .get_messages_for(connection_id)
            .await
            .iter()
            .map(|raw| serde_json::from_str(raw).expect("outbound frame should be valid JSON"))
            .collect();
        Self {
            connection_id: connection_id.to_string(),
            events,
        }
    }

    pub fn of_type(&self, event_name: &str) -> Vec<&Value> {
        self.events
            .iter()
            .filter(|e| e["event"] == event_name)
            .collect()
    }

    pub fn single(&self, event_name: &str) -> &Value {
        let matching = self.of_type(event_name);
        assert_eq!(
            matching.len(),
            1,
            "{} should have received exactly one {} event, got {}",
            self.connection_id,
            event_name,
            matching.len()
        );
        &matching[0]["data"]
    }

    pub fn assert_none_of_type(&self, event_name: &str) {
        assert!(
            self.of_type(event_name).is_empty(),
            "{} should not have received any {} events",
            self.connection_id,
            event_name
        );
    }

    pub fn assert_empty(&self) {
        assert!(
            self.events.is_empty(),
            "{} should not have received any events, got {:?}",
            self.connection_id,
            self.events
        );
    }

    /// Latest booking_updated payload, the canonical record the client holds.
    pub fn latest_booking(&self) -> &Value {
        let updates = self.of_type("booking_updated");
        assert!(
            !updates.is_empty(),
            "{} should have received at least one booking_updated event",
            self.connection_id
        );
        &updates[updates.len() - 1]["data"]
    }
}
