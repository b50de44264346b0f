use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use axum::{Json, extract::State};
use formline_core::AppError;
use formline_models::roles::PrincipalView;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, ToSchema)]
pub struct SignOutResponse {
    pub message: String,
}

/// Current principal, served from the session cache when fresh
#[utoipa::path(
    get,
    path = "/api/session/me",
    responses(
        (status = 200, description = "Current principal", body = PrincipalView),
        (status = 401, description = "Unauthorized or session no longer valid", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Session"
)]
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<PrincipalView>, AppError> {
    let current = state
        .sessions
        .refresh(state.principals.as_ref(), principal.id, false)
        .await?
        .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Session is no longer valid")))?;
    Ok(Json(PrincipalView::from(&current)))
}

/// Force a refresh of the cached principal
#[utoipa::path(
    post,
    path = "/api/session/refresh",
    responses(
        (status = 200, description = "Refreshed principal", body = PrincipalView),
        (status = 401, description = "Unauthorized or session no longer valid", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Session"
)]
#[instrument(skip(state))]
pub async fn refresh(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<PrincipalView>, AppError> {
    let current = state
        .sessions
        .refresh(state.principals.as_ref(), principal.id, true)
        .await?
        .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Session is no longer valid")))?;
    Ok(Json(PrincipalView::from(&current)))
}

/// Drop the cached session entry
#[utoipa::path(
    post,
    path = "/api/session/sign-out",
    responses(
        (status = 200, description = "Signed out", body = SignOutResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Session"
)]
#[instrument(skip(state))]
pub async fn sign_out(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<SignOutResponse>, AppError> {
    state.sessions.sign_out(principal.id);
    Ok(Json(SignOutResponse {
        message: "Signed out".to_string(),
    }))
}
