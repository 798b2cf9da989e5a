//! Connection listing and forced disconnects.

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;

use staffhub_core::error::AppError;
use staffhub_core::types::UserId;
use staffhub_realtime::connection::ConnectionInfo;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::{require_admin, require_manager};
use crate::state::AppState;

/// GET /api/notifications/connections
pub async fn list_connections(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<ConnectionInfo>>>, ApiError> {
    require_manager(&auth)?;
    let mut connections: Vec<ConnectionInfo> = state
        .realtime
        .registry
        .snapshot(None)
        .iter()
        .map(|c| c.info())
        .collect();
    connections.sort_by_key(|c| c.connected_at);
    Ok(Json(ApiResponse::ok(connections)))
}

/// DELETE /api/notifications/connections/{user_id}
///
/// Ends the user's stream. The client is free to reconnect.
pub async fn disconnect_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<ApiResponse<ConnectionInfo>>, ApiError> {
    require_admin(&auth)?;
    let connection = state
        .realtime
        .registry
        .unregister(&user_id)
        .ok_or_else(|| AppError::not_found(format!("User {user_id} is not connected")))?;
    connection.close();

    info!(
        admin = %auth.user_id,
        user_id = %user_id,
        connection_id = %connection.id,
        "Notification stream closed by admin"
    );
    Ok(Json(ApiResponse::ok(connection.info())))
}
