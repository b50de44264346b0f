//! Submission domain models and the approval status type.
//!
//! A submission is the per-school, per-category bundle of column values. Its
//! status is owned exclusively by the approval state machine; every status
//! write goes through a compare-and-set so concurrent approvers cannot
//! silently overwrite each other.

use crate::ids::{CategoryId, ColumnId, SchoolId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

/// Lifecycle status of a submission.
///
/// `Draft` is initial (created implicitly on the first value write).
/// `Approved` is terminal for mutation purposes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "submission_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether values may still be edited in this status.
    ///
    /// Pending is frozen so data cannot change under an approver mid-review;
    /// Approved is frozen permanently.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a submission: one per (school, category) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct SubmissionKey {
    #[schema(value_type = String, format = "uuid")]
    pub school_id: SchoolId,
    #[schema(value_type = String, format = "uuid")]
    pub category_id: CategoryId,
}

impl SubmissionKey {
    pub fn new(school_id: SchoolId, category_id: CategoryId) -> Self {
        Self {
            school_id,
            category_id,
        }
    }
}

impl fmt::Display for SubmissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.school_id, self.category_id)
    }
}

/// A submission as held by the store.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Submission {
    #[serde(flatten)]
    pub key: SubmissionKey,
    pub status: SubmissionStatus,
    /// Column values keyed by column id. Values are stored as strings; typed
    /// validation happens at write time against the column definition.
    #[schema(value_type = Object)]
    pub values: HashMap<ColumnId, String>,
    pub rejection_reason: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission view returned to callers, with the derived completion figure.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionView {
    #[serde(flatten)]
    pub key: SubmissionKey,
    pub status: SubmissionStatus,
    #[schema(value_type = Object)]
    pub values: HashMap<ColumnId, String>,
    pub rejection_reason: Option<String>,
    /// Required columns with a non-empty value over total required columns,
    /// as a whole percentage. 100 when the category has no required columns.
    pub completion_percentage: u8,
    pub submitted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WriteValueDto {
    #[schema(value_type = String, format = "uuid")]
    pub column_id: ColumnId,
    pub value: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RejectDto {
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
}

/// Compact row for approval queue listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QueueItem {
    #[serde(flatten)]
    pub key: SubmissionKey,
    pub school_name: String,
    pub category_name: String,
    pub status: SubmissionStatus,
    pub completion_percentage: u8,
    pub submitted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
