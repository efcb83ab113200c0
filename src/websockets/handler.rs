use axum::{
    extract::{State, WebSocketUpgrade},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::shared::{AppError, AppState};

use super::gateway::SessionGateway;
use super::socket::Connection;

/// WebSocket endpoint that handles authentication via Sec-WebSocket-Protocol header
/// GET /ws with the session JWT in the Sec-WebSocket-Protocol header.
///
/// Unauthenticated connections are rejected before upgrade, so no event from
/// them is ever queued.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    let jwt_token = headers
        .get("sec-websocket-protocol")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing or invalid Sec-WebSocket-Protocol header");
            AppError::Unauthorized("Missing authentication token".to_string())
        })?;

    let claims = app_state.session_service.validate_session(jwt_token).await?;

    info!(
        user_id = claims.user_id,
        role = %claims.role,
        "WebSocket authentication successful"
    );

    Ok(ws.on_upgrade(move |socket| handle_websocket_connection(socket, claims, app_state)))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    claims: crate::session::SessionClaims,
    app_state: AppState,
) {
    let connection_id = Uuid::new_v4().to_string();

    info!(
        connection_id = %connection_id,
        user_id = claims.user_id,
        "WebSocket connection established"
    );

    // Outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    app_state
        .connection_manager
        .add_connection(connection_id.clone(), outbound_sender)
        .await;

    let gateway = Arc::new(SessionGateway::new(
        connection_id.clone(),
        claims,
        app_state.clone(),
    ));

    let connection = Connection::new(
        connection_id.clone(),
        Box::new(socket),
        outbound_receiver,
        gateway.clone(),
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(connection_id = %connection_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(
                connection_id = %connection_id,
                error = ?e,
                "WebSocket connection error"
            );
        }
    }

    // Cleanup: deregister the outbound channel, then leave any joined room
    // exactly once. An in-flight request for this connection still completes
    // and its broadcast still fires; only future events stop being accepted.
    app_state
        .connection_manager
        .remove_connection(&connection_id)
        .await;
    gateway.on_disconnect().await;

    info!(connection_id = %connection_id, "WebSocket cleanup complete");
}
