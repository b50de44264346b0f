//! The submission lifecycle state machine.
//!
//! Legal transitions:
//!
//! ```text
//! Draft --submit--> Pending --approve--> Approved
//!                      |
//!                      +-----reject----> Rejected --reset--> Draft
//! ```
//!
//! Every transition is guarded (who may trigger it), conditioned (what must
//! hold first) and written with a compare-and-set, so a racing approver can
//! never overwrite a decision that already landed.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{info, instrument};
use validator::ValidateEmail;

use formline_core::{AppError, WorkflowError};
use formline_models::categories::{Column, ColumnType};
use formline_models::ids::ColumnId;
use formline_models::roles::{Principal, Role};
use formline_models::submissions::{
    Submission, SubmissionKey, SubmissionStatus, SubmissionView, WriteValueDto,
};

use crate::modules::access::model::AccessLevel;
use crate::modules::access::service::PermissionService;
use crate::store::{CategoryStore, HierarchyStore, StatusWrite, SubmissionStore};

pub struct SubmissionService;

/// Completion as a whole percentage, from required-column counts.
/// A category with no required columns is always complete.
pub fn completion_from_counts(required_total: i64, required_filled: i64) -> u8 {
    if required_total <= 0 {
        return 100;
    }
    ((required_filled.clamp(0, required_total) * 100) / required_total) as u8
}

/// Required columns whose value is missing or blank.
fn missing_required(columns: &[Column], values: &HashMap<ColumnId, String>) -> Vec<String> {
    columns
        .iter()
        .filter(|c| c.required)
        .filter(|c| !values.get(&c.id).is_some_and(|v| !v.trim().is_empty()))
        .map(|c| c.name.clone())
        .collect()
}

fn completion_of(columns: &[Column], values: &HashMap<ColumnId, String>) -> u8 {
    let required: Vec<&Column> = columns.iter().filter(|c| c.required).collect();
    let filled = required
        .iter()
        .filter(|c| values.get(&c.id).is_some_and(|v| !v.trim().is_empty()))
        .count() as i64;
    completion_from_counts(required.len() as i64, filled)
}

impl SubmissionService {
    /// Read a submission, synthesizing an empty draft when no row exists yet
    /// (a submission comes into being on the first value write, so a read
    /// before that sees the same empty draft a write would create).
    #[instrument(skip(hierarchy, categories, submissions, principal), fields(role = %principal.role))]
    pub async fn get_submission(
        hierarchy: &dyn HierarchyStore,
        categories: &dyn CategoryStore,
        submissions: &dyn SubmissionStore,
        principal: &Principal,
        key: SubmissionKey,
    ) -> Result<SubmissionView, AppError> {
        PermissionService::require_school_access(hierarchy, principal, key.school_id, AccessLevel::Read)
            .await?;
        let columns = Self::visible_columns(categories, principal, key).await?;

        match submissions.submission(key).await? {
            Some(submission) => Ok(Self::view(&columns, submission)),
            None => {
                let now = chrono::Utc::now();
                Ok(SubmissionView {
                    key,
                    status: SubmissionStatus::Draft,
                    values: HashMap::new(),
                    rejection_reason: None,
                    completion_percentage: completion_of(&columns, &HashMap::new()),
                    submitted_at: None,
                    updated_at: now,
                })
            }
        }
    }

    /// Write one column value. Creates the submission as a draft on first
    /// write. Refused while Pending (locked for review, 403) and while
    /// Approved (editing would demand a status change, 409).
    #[instrument(skip(hierarchy, categories, submissions, principal, dto), fields(role = %principal.role, column = %dto.column_id))]
    pub async fn write_value(
        hierarchy: &dyn HierarchyStore,
        categories: &dyn CategoryStore,
        submissions: &dyn SubmissionStore,
        principal: &Principal,
        key: SubmissionKey,
        dto: WriteValueDto,
    ) -> Result<SubmissionView, AppError> {
        PermissionService::require_school_access(
            hierarchy,
            principal,
            key.school_id,
            AccessLevel::Write,
        )
        .await?;
        let columns = Self::visible_columns(categories, principal, key).await?;

        let column = columns
            .iter()
            .find(|c| c.id == dto.column_id)
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Column not found in category")))?;
        validate_value(column, &dto.value)?;

        if let Some(existing) = submissions.submission(key).await? {
            match existing.status {
                SubmissionStatus::Pending => {
                    return Err(AppError::forbidden(anyhow::anyhow!(
                        "Submission is pending approval and is locked"
                    )));
                }
                SubmissionStatus::Approved => {
                    return Err(AppError::conflict(anyhow::anyhow!(
                        "Submission is approved and cannot be edited"
                    )));
                }
                SubmissionStatus::Draft | SubmissionStatus::Rejected => {}
            }
        }

        let submission = submissions.upsert_value(key, dto.column_id, dto.value).await?;
        Ok(Self::view(&columns, submission))
    }

    /// Draft -> Pending. Owner-only, and only once every required column has
    /// a non-blank value.
    #[instrument(skip(hierarchy, categories, submissions, principal), fields(role = %principal.role))]
    pub async fn submit(
        hierarchy: &dyn HierarchyStore,
        categories: &dyn CategoryStore,
        submissions: &dyn SubmissionStore,
        principal: &Principal,
        key: SubmissionKey,
    ) -> Result<SubmissionView, WorkflowError> {
        Self::require_owner(principal, key)?;
        PermissionService::require_school_access(
            hierarchy,
            principal,
            key.school_id,
            AccessLevel::Write,
        )
        .await?;

        let columns = Self::columns_for(categories, key).await?;
        let submission = submissions
            .submission(key)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Submission".to_string()))?;

        if submission.status != SubmissionStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                from: submission.status.as_str().to_string(),
                to: SubmissionStatus::Pending.as_str().to_string(),
            });
        }

        let missing = missing_required(&columns, &submission.values);
        if !missing.is_empty() {
            return Err(WorkflowError::IncompletePrecondition { missing });
        }

        let updated = Self::cas(
            submissions,
            key,
            SubmissionStatus::Draft,
            SubmissionStatus::Pending,
            None,
        )
        .await?;

        info!(submission = %key, "Submission moved to pending; approvers notified");
        Ok(Self::view(&columns, updated))
    }

    /// Pending -> Approved. Approver roles only, inside their scope.
    #[instrument(skip(hierarchy, categories, submissions, principal), fields(role = %principal.role))]
    pub async fn approve(
        hierarchy: &dyn HierarchyStore,
        categories: &dyn CategoryStore,
        submissions: &dyn SubmissionStore,
        principal: &Principal,
        key: SubmissionKey,
    ) -> Result<SubmissionView, WorkflowError> {
        Self::require_approver(principal)?;
        PermissionService::require_school_access(
            hierarchy,
            principal,
            key.school_id,
            AccessLevel::Write,
        )
        .await?;

        let columns = Self::columns_for(categories, key).await?;
        let updated = Self::cas(
            submissions,
            key,
            SubmissionStatus::Pending,
            SubmissionStatus::Approved,
            None,
        )
        .await?;

        info!(submission = %key, "Submission approved; owner notified");
        Ok(Self::view(&columns, updated))
    }

    /// Pending -> Rejected, with a mandatory reason for the owner.
    #[instrument(skip(hierarchy, categories, submissions, principal, reason), fields(role = %principal.role))]
    pub async fn reject(
        hierarchy: &dyn HierarchyStore,
        categories: &dyn CategoryStore,
        submissions: &dyn SubmissionStore,
        principal: &Principal,
        key: SubmissionKey,
        reason: String,
    ) -> Result<SubmissionView, WorkflowError> {
        Self::require_approver(principal)?;
        PermissionService::require_school_access(
            hierarchy,
            principal,
            key.school_id,
            AccessLevel::Write,
        )
        .await?;

        let columns = Self::columns_for(categories, key).await?;
        let updated = Self::cas(
            submissions,
            key,
            SubmissionStatus::Pending,
            SubmissionStatus::Rejected,
            Some(reason),
        )
        .await?;

        info!(submission = %key, "Submission rejected; owner notified");
        Ok(Self::view(&columns, updated))
    }

    /// Rejected -> Draft. Owner-only; values are retained and the rejection
    /// reason is cleared so the owner can amend and resubmit.
    #[instrument(skip(hierarchy, categories, submissions, principal), fields(role = %principal.role))]
    pub async fn reset(
        hierarchy: &dyn HierarchyStore,
        categories: &dyn CategoryStore,
        submissions: &dyn SubmissionStore,
        principal: &Principal,
        key: SubmissionKey,
    ) -> Result<SubmissionView, WorkflowError> {
        Self::require_owner(principal, key)?;
        PermissionService::require_school_access(
            hierarchy,
            principal,
            key.school_id,
            AccessLevel::Write,
        )
        .await?;

        let columns = Self::columns_for(categories, key).await?;
        let updated = Self::cas(
            submissions,
            key,
            SubmissionStatus::Rejected,
            SubmissionStatus::Draft,
            None,
        )
        .await?;

        Ok(Self::view(&columns, updated))
    }

    /// CAS write plus loser handling: on conflict, re-read and report the
    /// transition that actually failed, or not-found when no row exists.
    async fn cas(
        submissions: &dyn SubmissionStore,
        key: SubmissionKey,
        from: SubmissionStatus,
        to: SubmissionStatus,
        reason: Option<String>,
    ) -> Result<Submission, WorkflowError> {
        match submissions.write_status(key, from, to, reason).await? {
            StatusWrite::Applied => submissions
                .submission(key)
                .await?
                .ok_or_else(|| WorkflowError::NotFound("Submission".to_string())),
            StatusWrite::Conflict => match submissions.submission(key).await? {
                Some(current) => Err(WorkflowError::InvalidTransition {
                    from: current.status.as_str().to_string(),
                    to: to.as_str().to_string(),
                }),
                None => Err(WorkflowError::NotFound("Submission".to_string())),
            },
        }
    }

    // Submit and Reset belong to the owning school alone; approvers and
    // superadmin act on submissions only through approve/reject.
    fn require_owner(principal: &Principal, key: SubmissionKey) -> Result<(), WorkflowError> {
        match &principal.role {
            Role::SchoolAdmin(school_id) if *school_id == key.school_id => Ok(()),
            role => Err(WorkflowError::AccessDenied(format!(
                "only the school's admin may do this, not {}",
                role.tag()
            ))),
        }
    }

    fn require_approver(principal: &Principal) -> Result<(), WorkflowError> {
        if principal.role.is_approver() {
            Ok(())
        } else {
            Err(WorkflowError::AccessDenied(format!(
                "{} cannot approve or reject submissions",
                principal.role.tag()
            )))
        }
    }

    async fn columns_for(
        categories: &dyn CategoryStore,
        key: SubmissionKey,
    ) -> Result<Vec<Column>, WorkflowError> {
        categories
            .category(key.category_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Category".to_string()))?;
        Ok(categories.columns(key.category_id).await?)
    }

    async fn visible_columns(
        categories: &dyn CategoryStore,
        principal: &Principal,
        key: SubmissionKey,
    ) -> Result<Vec<Column>, AppError> {
        let category = categories
            .category(key.category_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Category not found")))?;
        if !PermissionService::category_visible_to(&principal.role, category.assignment) {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Category is not visible to your role"
            )));
        }
        Ok(categories.columns(key.category_id).await?)
    }

    fn view(columns: &[Column], submission: Submission) -> SubmissionView {
        SubmissionView {
            key: submission.key,
            status: submission.status,
            completion_percentage: completion_of(columns, &submission.values),
            values: submission.values,
            rejection_reason: submission.rejection_reason,
            submitted_at: submission.submitted_at,
            updated_at: submission.updated_at,
        }
    }
}

/// Validate a raw value against its column definition.
fn validate_value(column: &Column, value: &str) -> Result<(), AppError> {
    if let Some(max_length) = column.max_length {
        if value.chars().count() as i64 > max_length as i64 {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "Value for '{}' exceeds maximum length {}",
                column.name,
                max_length
            )));
        }
    }

    // Blank values are always storable; they just do not count as filled.
    if value.trim().is_empty() {
        return Ok(());
    }

    match column.column_type {
        ColumnType::Text | ColumnType::File => Ok(()),
        ColumnType::Number => {
            let parsed: f64 = value.trim().parse().map_err(|_| {
                AppError::unprocessable(anyhow::anyhow!(
                    "Value for '{}' is not a number",
                    column.name
                ))
            })?;
            if column.min_value.is_some_and(|min| parsed < min) {
                return Err(AppError::unprocessable(anyhow::anyhow!(
                    "Value for '{}' is below the minimum",
                    column.name
                )));
            }
            if column.max_value.is_some_and(|max| parsed > max) {
                return Err(AppError::unprocessable(anyhow::anyhow!(
                    "Value for '{}' is above the maximum",
                    column.name
                )));
            }
            Ok(())
        }
        ColumnType::Date => {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                AppError::unprocessable(anyhow::anyhow!(
                    "Value for '{}' is not a valid date (expected YYYY-MM-DD)",
                    column.name
                ))
            })?;
            Ok(())
        }
        ColumnType::Email => {
            if value.trim().validate_email() {
                Ok(())
            } else {
                Err(AppError::unprocessable(anyhow::anyhow!(
                    "Value for '{}' is not a valid email address",
                    column.name
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use formline_models::ids::CategoryId;

    fn column(name: &str, column_type: ColumnType, required: bool) -> Column {
        let now = Utc::now();
        Column {
            id: ColumnId::new(),
            category_id: CategoryId::new(),
            name: name.to_string(),
            column_type,
            required,
            max_length: None,
            min_value: None,
            max_value: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_completion_no_required_columns() {
        assert_eq!(completion_from_counts(0, 0), 100);
        let columns = vec![column("optional", ColumnType::Text, false)];
        assert_eq!(completion_of(&columns, &HashMap::new()), 100);
    }

    #[test]
    fn test_completion_partial() {
        let a = column("a", ColumnType::Text, true);
        let b = column("b", ColumnType::Text, true);
        let mut values = HashMap::new();
        values.insert(a.id, "filled".to_string());
        let columns = vec![a, b];
        assert_eq!(completion_of(&columns, &values), 50);
    }

    #[test]
    fn test_blank_value_not_counted() {
        let a = column("a", ColumnType::Text, true);
        let mut values = HashMap::new();
        values.insert(a.id, "   ".to_string());
        let columns = vec![a];
        assert_eq!(completion_of(&columns, &values), 0);
        assert_eq!(missing_required(&columns, &values), vec!["a".to_string()]);
    }

    #[test]
    fn test_validate_number_bounds() {
        let mut col = column("enrolment", ColumnType::Number, true);
        col.min_value = Some(0.0);
        col.max_value = Some(10_000.0);

        assert!(validate_value(&col, "250").is_ok());
        assert!(validate_value(&col, "-1").is_err());
        assert!(validate_value(&col, "20000").is_err());
        assert!(validate_value(&col, "abc").is_err());
    }

    #[test]
    fn test_validate_date_and_email() {
        let date = column("opened", ColumnType::Date, false);
        assert!(validate_value(&date, "2025-09-01").is_ok());
        assert!(validate_value(&date, "01/09/2025").is_err());

        let email = column("contact", ColumnType::Email, false);
        assert!(validate_value(&email, "head@school.edu").is_ok());
        assert!(validate_value(&email, "not-an-email").is_err());
    }

    #[test]
    fn test_validate_max_length() {
        let mut col = column("motto", ColumnType::Text, false);
        col.max_length = Some(5);
        assert!(validate_value(&col, "short").is_ok());
        assert!(validate_value(&col, "too long").is_err());
    }

    #[test]
    fn test_blank_value_is_storable() {
        let col = column("enrolment", ColumnType::Number, true);
        assert!(validate_value(&col, "").is_ok());
    }
}
