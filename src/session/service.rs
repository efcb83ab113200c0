use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::SessionModel,
    repository::SessionRepository,
    token::TokenConfig,
    types::{SessionClaims, SessionResponse},
};
use crate::booking::models::Role;
use crate::shared::AppError;

/// Service for handling session business logic
pub struct SessionService {
    token_config: TokenConfig,
    repository: Arc<dyn SessionRepository + Send + Sync>,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository + Send + Sync>) -> Self {
        Self {
            token_config: TokenConfig::new(),
            repository,
        }
    }

    /// Creates a new session for the supplied identity and returns a signed
    /// JWT token to be presented at WebSocket handshake time.
    #[instrument(skip(self))]
    pub async fn create_session(
        &self,
        user_id: i64,
        role: Role,
    ) -> Result<SessionResponse, AppError> {
        let session = SessionModel::new(user_id, role, self.token_config.expiration_days);
        self.repository.create_session(&session).await?;

        let token = self
            .token_config
            .create_token(session.id.clone(), user_id, role)?;

        info!(
            session_id = %session.id,
            user_id,
            %role,
            "Session created successfully"
        );

        Ok(SessionResponse {
            token,
            session_id: session.id,
            user_id,
            role,
        })
    }

    /// Validates a session token and returns the claims if valid.
    ///
    /// Checks both the JWT signature/expiry and that the session still
    /// exists in the repository, so revoked sessions fail even with a
    /// structurally valid token.
    #[instrument(skip(self, token))]
    pub async fn validate_session(&self, token: &str) -> Result<SessionClaims, AppError> {
        let claims = self.token_config.validate_token(token)?;

        match self.repository.get_session(&claims.session_id).await? {
            Some(session) => {
                if session.is_expired() {
                    warn!(session_id = %claims.session_id, "Session has expired");
                    return Err(AppError::Unauthorized("Session has expired".to_string()));
                }
                Ok(claims)
            }
            None => {
                warn!(
                    session_id = %claims.session_id,
                    "Session not found - may have been revoked"
                );
                Err(AppError::Unauthorized(
                    "Session not found or has been revoked".to_string(),
                ))
            }
        }
    }

    /// Revokes a session so its token stops validating.
    #[instrument(skip(self))]
    pub async fn revoke_session(&self, session_id: &str) -> Result<(), AppError> {
        self.repository.delete_session(session_id).await?;
        info!(session_id = %session_id, "Session revoked");
        Ok(())
    }
}
