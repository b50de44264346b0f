use crate::middleware::auth::AuthUser;
use crate::modules::approvals::model::{BulkRequest, BulkResponse, QueueParams};
use crate::modules::approvals::service::ApprovalService;
use crate::modules::session::controller::ErrorResponse;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use formline_core::AppError;
use formline_models::submissions::QueueItem;
use tracing::instrument;
use validator::Validate;

/// List submissions in the caller's approval scope
#[utoipa::path(
    get,
    path = "/api/approvals",
    params(QueueParams),
    responses(
        (status = 200, description = "Queue items, oldest submission first", body = Vec<QueueItem>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requested school outside scope", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Approvals"
)]
#[instrument(skip(state))]
pub async fn get_queue(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(params): Query<QueueParams>,
) -> Result<Json<Vec<QueueItem>>, AppError> {
    let items = ApprovalService::list_queue(
        state.hierarchy.as_ref(),
        state.submissions.as_ref(),
        &principal,
        params,
    )
    .await?;
    Ok(Json(items))
}

/// Approve or reject many submissions in one call
#[utoipa::path(
    post,
    path = "/api/approvals/bulk",
    request_body = BulkRequest,
    responses(
        (status = 200, description = "Positional per-item outcomes", body = BulkResponse),
        (status = 400, description = "Malformed request (e.g. reject without reason)", body = ErrorResponse),
        (status = 403, description = "Caller cannot approve or reject", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Approvals"
)]
#[instrument(skip(state, request))]
pub async fn bulk_decide(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkResponse>, AppError> {
    request.validate().map_err(AppError::bad_request)?;
    let response = ApprovalService::bulk_transition(
        state.hierarchy.as_ref(),
        state.categories.as_ref(),
        state.submissions.as_ref(),
        &principal,
        request,
    )
    .await?;
    Ok(Json(response))
}
