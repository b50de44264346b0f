use crate::middleware::auth::AuthUser;
use crate::modules::access::model::{CheckAccessRequest, Decision};
use crate::modules::access::service::PermissionService;
use crate::modules::session::controller::ErrorResponse;
use crate::state::AppState;
use axum::{Json, extract::State};
use formline_core::AppError;
use tracing::instrument;

/// Evaluate whether the authenticated principal may perform an action
#[utoipa::path(
    post,
    path = "/api/access/check",
    request_body = CheckAccessRequest,
    responses(
        (status = 200, description = "Access decision", body = Decision),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Entity not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Access"
)]
#[instrument(skip(state))]
pub async fn check_access(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(req): Json<CheckAccessRequest>,
) -> Result<Json<Decision>, AppError> {
    let decision = PermissionService::check_access(
        state.hierarchy.as_ref(),
        state.categories.as_ref(),
        &principal,
        req.entity_kind,
        req.entity_id,
        req.level,
    )
    .await?;
    Ok(Json(decision))
}
