use formline_models::ids::{CategoryId, SchoolId};
use formline_models::submissions::{SubmissionKey, SubmissionStatus};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, IntoParams)]
pub struct QueueParams {
    /// Restrict to one status (all statuses within scope when omitted)
    pub status: Option<SubmissionStatus>,
    /// Restrict to one category
    pub category_id: Option<CategoryId>,
    /// Restrict to one school (403 when outside the caller's scope)
    pub school_id: Option<SchoolId>,
}

/// Decision applied to every item of a bulk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkRequest {
    pub action: BulkAction,
    /// Required when `action` is `reject`
    #[validate(length(min = 1, max = 1000))]
    pub reason: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub items: Vec<SubmissionKey>,
}

/// Per-item outcome. One bad item never aborts the batch; the caller reads
/// outcomes positionally against the request items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BulkOutcome {
    Success,
    Denied { reason: String },
    InvalidTransition { from: String },
    Error { message: String },
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkItemResult {
    #[serde(flatten)]
    pub key: SubmissionKey,
    #[serde(flatten)]
    pub outcome: BulkOutcome,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkResponse {
    pub results: Vec<BulkItemResult>,
    pub succeeded: usize,
    pub failed: usize,
}
