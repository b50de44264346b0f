//! The approval queue and the bulk decision engine.
//!
//! Listings are scope-narrowed at the query layer via [`ScopeFilter`], so an
//! approver only ever pulls rows their role can act on. Bulk decisions run
//! sequentially through the same single-item state machine; one failing item
//! records its outcome and never aborts the batch.

use tracing::{info, instrument, warn};

use formline_core::{AppError, WorkflowError};
use formline_models::roles::{Principal, Role};
use formline_models::submissions::QueueItem;

use crate::modules::access::service::PermissionService;
use crate::modules::approvals::model::{
    BulkAction, BulkItemResult, BulkOutcome, BulkRequest, BulkResponse, QueueParams,
};
use crate::modules::submissions::service::{SubmissionService, completion_from_counts};
use crate::store::{CategoryStore, HierarchyStore, QueueFilter, ScopeFilter, SubmissionStore};

pub struct ApprovalService;

impl ApprovalService {
    /// The widest listing scope a role is entitled to.
    pub fn scope_filter_for(role: &Role) -> ScopeFilter {
        match role {
            Role::SuperAdmin => ScopeFilter::All,
            Role::RegionAdmin(region_id) => ScopeFilter::Region(*region_id),
            Role::SectorAdmin(sector_id) => ScopeFilter::Sector(*sector_id),
            Role::SchoolAdmin(school_id) => ScopeFilter::School(*school_id),
        }
    }

    /// List submissions within the caller's scope, oldest submission first.
    ///
    /// A `school_id` filter pointing outside the caller's scope is an
    /// explicit denial, not an empty page.
    #[instrument(skip(hierarchy, submissions, principal), fields(role = %principal.role))]
    pub async fn list_queue(
        hierarchy: &dyn HierarchyStore,
        submissions: &dyn SubmissionStore,
        principal: &Principal,
        params: QueueParams,
    ) -> Result<Vec<QueueItem>, AppError> {
        if let Some(school_id) = params.school_id {
            let ancestors = hierarchy
                .school_ancestors(school_id)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("School not found")))?;
            if !PermissionService::scope_contains_school(&principal.role, school_id, &ancestors) {
                return Err(AppError::forbidden(anyhow::anyhow!(
                    "School is outside your scope"
                )));
            }
        }

        let rows = submissions
            .list(
                Self::scope_filter_for(&principal.role),
                QueueFilter {
                    status: params.status,
                    category_id: params.category_id,
                    school_id: params.school_id,
                },
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| QueueItem {
                key: row.key(),
                completion_percentage: completion_from_counts(
                    row.required_total,
                    row.required_filled,
                ),
                school_name: row.school_name,
                category_name: row.category_name,
                status: row.status,
                submitted_at: row.submitted_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Apply one decision to many submissions. Outcomes are positional:
    /// `results[i]` corresponds to `request.items[i]`.
    #[instrument(skip(hierarchy, categories, submissions, principal, request), fields(role = %principal.role, items = request.items.len()))]
    pub async fn bulk_transition(
        hierarchy: &dyn HierarchyStore,
        categories: &dyn CategoryStore,
        submissions: &dyn SubmissionStore,
        principal: &Principal,
        request: BulkRequest,
    ) -> Result<BulkResponse, AppError> {
        if !principal.role.is_approver() {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "{} cannot approve or reject submissions",
                principal.role.tag()
            )));
        }
        let reason = match request.action {
            BulkAction::Approve => None,
            BulkAction::Reject => Some(request.reason.clone().ok_or_else(|| {
                AppError::bad_request(anyhow::anyhow!("A reason is required when rejecting"))
            })?),
        };

        let mut results = Vec::with_capacity(request.items.len());
        for key in &request.items {
            let attempt = match request.action {
                BulkAction::Approve => {
                    SubmissionService::approve(hierarchy, categories, submissions, principal, *key)
                        .await
                }
                BulkAction::Reject => {
                    SubmissionService::reject(
                        hierarchy,
                        categories,
                        submissions,
                        principal,
                        *key,
                        reason.clone().unwrap_or_default(),
                    )
                    .await
                }
            };

            let outcome = match attempt {
                Ok(_) => BulkOutcome::Success,
                Err(WorkflowError::AccessDenied(reason)) => BulkOutcome::Denied { reason },
                Err(WorkflowError::InvalidTransition { from, .. }) => {
                    BulkOutcome::InvalidTransition { from }
                }
                Err(err @ WorkflowError::NotFound(_))
                | Err(err @ WorkflowError::IncompletePrecondition { .. }) => BulkOutcome::Error {
                    message: err.to_string(),
                },
                Err(WorkflowError::Store(err)) => {
                    warn!(submission = %key, "Bulk item failed on store error: {err}");
                    BulkOutcome::Error {
                        message: "internal store error".to_string(),
                    }
                }
            };
            results.push(BulkItemResult {
                key: *key,
                outcome,
            });
        }

        let succeeded = results
            .iter()
            .filter(|r| r.outcome == BulkOutcome::Success)
            .count();
        let failed = results.len() - succeeded;
        info!(succeeded, failed, "Bulk decision finished");

        Ok(BulkResponse {
            results,
            succeeded,
            failed,
        })
    }
}
