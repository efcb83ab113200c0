use axum::{extract::State, Json};
use tracing::{info, instrument};

use super::types::{SessionRequest, SessionResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for the session handshake
///
/// POST /session
/// Returns a signed JWT token for the supplied identity
#[instrument(name = "create_session", skip(state))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    info!(user_id = request.user_id, role = %request.role, "Creating new session");

    let session = state
        .session_service
        .create_session(request.user_id, request.role)
        .await?;

    info!(
        session_id = %session.session_id,
        user_id = session.user_id,
        "Session created successfully"
    );

    Ok(Json(session))
}
