use serde::{Deserialize, Serialize};

use crate::booking::models::Role;

/// JWT claims structure containing session information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub session_id: String,
    pub user_id: i64,
    pub role: Role,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Request body for the session handshake.
///
/// Identity verification itself is an external collaborator concern; this
/// subsystem turns a supplied identity into a signed token that the
/// WebSocket gateway can validate server-side.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub user_id: i64,
    pub role: Role,
}

/// Response structure for session creation endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub token: String,
    pub session_id: String,
    pub user_id: i64,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_claims_serialization() {
        let claims = SessionClaims {
            session_id: "test-id".to_string(),
            user_id: 7,
            role: Role::Provider,
            exp: 1234567890,
            iat: 1234567800,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("test-id"));
        assert!(json.contains("provider"));

        let deserialized: SessionClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, claims);
    }

    #[test]
    fn test_session_request_accepts_wire_roles() {
        let request: SessionRequest =
            serde_json::from_str(r#"{"user_id": 3, "role": "client"}"#).unwrap();
        assert_eq!(request.user_id, 3);
        assert_eq!(request.role, Role::Client);
    }
}
