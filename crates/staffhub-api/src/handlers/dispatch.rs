//! Producer dispatch handler.

use axum::Json;
use axum::extract::State;
use tracing::info;

use staffhub_realtime::DeliveryReport;

use crate::dto::request::{DispatchRequest, DispatchTarget};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_manager;
use crate::state::AppState;

/// POST /api/notifications/dispatch
///
/// Delivers a notification to the requested recipients. Offline recipients
/// are skipped; the report says how many connections were reached.
pub async fn dispatch(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<DispatchRequest>,
) -> Result<Json<ApiResponse<DeliveryReport>>, ApiError> {
    require_manager(&auth)?;

    let dispatcher = &state.realtime.dispatcher;
    let report = match &req.target {
        DispatchTarget::User { user_id } => dispatcher.send_to_user(*user_id, req.notification)?,
        DispatchTarget::Users { user_ids } => {
            dispatcher.send_to_users(user_ids, req.notification)?
        }
        DispatchTarget::Roles { roles } => {
            dispatcher.broadcast_to_roles(req.notification, roles)?
        }
        DispatchTarget::All => dispatcher.broadcast_all(req.notification)?,
    };

    info!(
        sender = %auth.user_id,
        message_id = %report.message_id,
        targeted = report.targeted,
        delivered = report.delivered,
        "Notification dispatched via API"
    );

    Ok(Json(ApiResponse::ok(report)))
}
