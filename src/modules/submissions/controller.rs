use crate::middleware::auth::AuthUser;
use crate::modules::session::controller::ErrorResponse;
use crate::modules::submissions::service::SubmissionService;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use formline_core::AppError;
use formline_models::ids::{CategoryId, SchoolId};
use formline_models::submissions::{RejectDto, SubmissionKey, SubmissionView, WriteValueDto};
use tracing::instrument;
use validator::Validate;

/// Get a submission (an empty draft when nothing has been written yet)
#[utoipa::path(
    get,
    path = "/api/submissions/{school_id}/{category_id}",
    params(
        ("school_id" = SchoolId, Path, description = "School id"),
        ("category_id" = CategoryId, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Submission", body = SubmissionView),
        (status = 403, description = "School or category outside scope", body = ErrorResponse),
        (status = 404, description = "School or category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
#[instrument(skip(state))]
pub async fn get_submission(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((school_id, category_id)): Path<(SchoolId, CategoryId)>,
) -> Result<Json<SubmissionView>, AppError> {
    let view = SubmissionService::get_submission(
        state.hierarchy.as_ref(),
        state.categories.as_ref(),
        state.submissions.as_ref(),
        &principal,
        SubmissionKey::new(school_id, category_id),
    )
    .await?;
    Ok(Json(view))
}

/// Write one column value
#[utoipa::path(
    put,
    path = "/api/submissions/{school_id}/{category_id}/values",
    params(
        ("school_id" = SchoolId, Path, description = "School id"),
        ("category_id" = CategoryId, Path, description = "Category id")
    ),
    request_body = WriteValueDto,
    responses(
        (status = 200, description = "Updated submission", body = SubmissionView),
        (status = 403, description = "School outside scope", body = ErrorResponse),
        (status = 409, description = "Submission is frozen", body = ErrorResponse),
        (status = 422, description = "Value fails column validation", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
#[instrument(skip(state, dto))]
pub async fn write_value(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((school_id, category_id)): Path<(SchoolId, CategoryId)>,
    Json(dto): Json<WriteValueDto>,
) -> Result<Json<SubmissionView>, AppError> {
    dto.validate().map_err(AppError::bad_request)?;
    let view = SubmissionService::write_value(
        state.hierarchy.as_ref(),
        state.categories.as_ref(),
        state.submissions.as_ref(),
        &principal,
        SubmissionKey::new(school_id, category_id),
        dto,
    )
    .await?;
    Ok(Json(view))
}

/// Submit a draft for approval
#[utoipa::path(
    post,
    path = "/api/submissions/{school_id}/{category_id}/submit",
    params(
        ("school_id" = SchoolId, Path, description = "School id"),
        ("category_id" = CategoryId, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Submission now pending", body = SubmissionView),
        (status = 403, description = "Caller is not the school's admin", body = ErrorResponse),
        (status = 409, description = "Submission is not in draft", body = ErrorResponse),
        (status = 422, description = "Required columns missing values", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
#[instrument(skip(state))]
pub async fn submit(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((school_id, category_id)): Path<(SchoolId, CategoryId)>,
) -> Result<Json<SubmissionView>, AppError> {
    let view = SubmissionService::submit(
        state.hierarchy.as_ref(),
        state.categories.as_ref(),
        state.submissions.as_ref(),
        &principal,
        SubmissionKey::new(school_id, category_id),
    )
    .await?;
    Ok(Json(view))
}

/// Approve a pending submission
#[utoipa::path(
    post,
    path = "/api/submissions/{school_id}/{category_id}/approve",
    params(
        ("school_id" = SchoolId, Path, description = "School id"),
        ("category_id" = CategoryId, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Submission approved", body = SubmissionView),
        (status = 403, description = "Caller cannot approve here", body = ErrorResponse),
        (status = 409, description = "Submission is not pending", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
#[instrument(skip(state))]
pub async fn approve(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((school_id, category_id)): Path<(SchoolId, CategoryId)>,
) -> Result<Json<SubmissionView>, AppError> {
    let view = SubmissionService::approve(
        state.hierarchy.as_ref(),
        state.categories.as_ref(),
        state.submissions.as_ref(),
        &principal,
        SubmissionKey::new(school_id, category_id),
    )
    .await?;
    Ok(Json(view))
}

/// Reject a pending submission with a reason
#[utoipa::path(
    post,
    path = "/api/submissions/{school_id}/{category_id}/reject",
    params(
        ("school_id" = SchoolId, Path, description = "School id"),
        ("category_id" = CategoryId, Path, description = "Category id")
    ),
    request_body = RejectDto,
    responses(
        (status = 200, description = "Submission rejected", body = SubmissionView),
        (status = 400, description = "Missing or oversized reason", body = ErrorResponse),
        (status = 403, description = "Caller cannot reject here", body = ErrorResponse),
        (status = 409, description = "Submission is not pending", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
#[instrument(skip(state, dto))]
pub async fn reject(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((school_id, category_id)): Path<(SchoolId, CategoryId)>,
    Json(dto): Json<RejectDto>,
) -> Result<Json<SubmissionView>, AppError> {
    dto.validate().map_err(AppError::bad_request)?;
    let view = SubmissionService::reject(
        state.hierarchy.as_ref(),
        state.categories.as_ref(),
        state.submissions.as_ref(),
        &principal,
        SubmissionKey::new(school_id, category_id),
        dto.reason,
    )
    .await?;
    Ok(Json(view))
}

/// Return a rejected submission to draft, keeping its values
#[utoipa::path(
    post,
    path = "/api/submissions/{school_id}/{category_id}/reset",
    params(
        ("school_id" = SchoolId, Path, description = "School id"),
        ("category_id" = CategoryId, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Submission back in draft", body = SubmissionView),
        (status = 403, description = "Caller is not the school's admin", body = ErrorResponse),
        (status = 409, description = "Submission is not rejected", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Submissions"
)]
#[instrument(skip(state))]
pub async fn reset(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path((school_id, category_id)): Path<(SchoolId, CategoryId)>,
) -> Result<Json<SubmissionView>, AppError> {
    let view = SubmissionService::reset(
        state.hierarchy.as_ref(),
        state.categories.as_ref(),
        state.submissions.as_ref(),
        &principal,
        SubmissionKey::new(school_id, category_id),
    )
    .await?;
    Ok(Json(view))
}
