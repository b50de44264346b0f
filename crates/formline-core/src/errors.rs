//! Application error types.
//!
//! Two layers of errors live here:
//!
//! - [`AppError`] wraps an [`anyhow::Error`] with an HTTP status and converts
//!   into a JSON response at the axum boundary.
//! - [`WorkflowError`] is the approval-workflow taxonomy. Services return it
//!   so callers can tell "not allowed" (`AccessDenied`), "not legal from this
//!   state" (`InvalidTransition`), and "could not determine" (`Store`) apart.
//!   It converts into an `AppError` at the HTTP boundary.
//!
//! Plain permission checks do not use either type for denial: the evaluator
//! returns a `Decision` value. `WorkflowError::AccessDenied` exists for the
//! state-machine guards, where a denial aborts the requested transition.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNAUTHORIZED, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::FORBIDDEN, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error.to_string()
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

/// Error taxonomy for the approval workflow.
///
/// Every state-machine operation returns `Result<_, WorkflowError>`. The bulk
/// engine maps each variant to a per-item outcome instead of aborting the
/// batch.
#[derive(Debug)]
pub enum WorkflowError {
    /// The principal lacks the required scope or level for this operation.
    AccessDenied(String),
    /// The requested status change is not legal from the current status.
    InvalidTransition { from: String, to: String },
    /// A precondition is unmet, e.g. submitting below 100% completion.
    /// Carries the names of the missing required columns when known.
    IncompletePrecondition { missing: Vec<String> },
    /// A referenced entity (school, sector, region, submission) is absent.
    NotFound(String),
    /// The underlying store failed; distinct from denial so callers can
    /// decide retry policy.
    Store(Error),
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessDenied(reason) => write!(f, "Access denied: {}", reason),
            Self::InvalidTransition { from, to } => {
                write!(f, "Invalid transition from {} to {}", from, to)
            }
            Self::IncompletePrecondition { missing } => {
                write!(
                    f,
                    "Precondition not met; missing required fields: {}",
                    missing.join(", ")
                )
            }
            Self::NotFound(what) => write!(f, "{} not found", what),
            Self::Store(err) => write!(f, "Store error: {}", err),
        }
    }
}

// No std::error::Error impl: that would route WorkflowError through the
// blanket `Into<anyhow::Error>` conversion above and clash with the status
// mapping below.
impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let status = match &err {
            WorkflowError::AccessDenied(_) => StatusCode::FORBIDDEN,
            WorkflowError::InvalidTransition { .. } => StatusCode::CONFLICT,
            WorkflowError::IncompletePrecondition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, anyhow::anyhow!("{}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_error_status_mapping() {
        let denied = AppError::from(WorkflowError::AccessDenied("outside scope".into()));
        assert_eq!(denied.status, StatusCode::FORBIDDEN);

        let invalid = AppError::from(WorkflowError::InvalidTransition {
            from: "approved".into(),
            to: "approved".into(),
        });
        assert_eq!(invalid.status, StatusCode::CONFLICT);

        let incomplete = AppError::from(WorkflowError::IncompletePrecondition {
            missing: vec!["student_count".into()],
        });
        assert_eq!(incomplete.status, StatusCode::UNPROCESSABLE_ENTITY);

        let missing = AppError::from(WorkflowError::NotFound("School".into()));
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::not_found(anyhow::anyhow!("School not found"));
        assert_eq!(err.to_string(), "School not found");
    }

    #[test]
    fn test_workflow_error_display() {
        let err = WorkflowError::IncompletePrecondition {
            missing: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            err.to_string(),
            "Precondition not met; missing required fields: a, b"
        );

        let err = WorkflowError::InvalidTransition {
            from: "pending".into(),
            to: "draft".into(),
        };
        assert_eq!(err.to_string(), "Invalid transition from pending to draft");
    }
}
