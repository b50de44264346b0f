mod common;

use axum::http::StatusCode;
use common::{World, world};
use formline::modules::submissions::service::SubmissionService;
use formline_core::WorkflowError;
use formline_models::submissions::{SubmissionKey, SubmissionStatus, WriteValueDto};

fn key(w: &World) -> SubmissionKey {
    SubmissionKey::new(w.school.id, w.category.id)
}

async fn fill_required(w: &World) {
    for (column, value) in [(&w.enrolment, "240"), (&w.contact, "head@north-a-1.test")] {
        SubmissionService::write_value(
            w.store.as_ref(),
            w.store.as_ref(),
            w.store.as_ref(),
            &w.school_admin,
            key(w),
            WriteValueDto {
                column_id: column.id,
                value: value.to_string(),
            },
        )
        .await
        .expect("value write");
    }
}

#[tokio::test]
async fn first_write_creates_draft() {
    let w = world();
    let view = SubmissionService::write_value(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
        WriteValueDto {
            column_id: w.enrolment.id,
            value: "120".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(view.status, SubmissionStatus::Draft);
    assert_eq!(view.completion_percentage, 50);
}

#[tokio::test]
async fn submit_requires_full_completion() {
    let w = world();
    SubmissionService::write_value(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
        WriteValueDto {
            column_id: w.enrolment.id,
            value: "120".to_string(),
        },
    )
    .await
    .unwrap();

    let err = SubmissionService::submit(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
    )
    .await
    .unwrap_err();

    match err {
        WorkflowError::IncompletePrecondition { missing } => {
            assert_eq!(missing, vec!["Contact email".to_string()]);
        }
        other => panic!("expected IncompletePrecondition, got {other}"),
    }
}

#[tokio::test]
async fn full_lifecycle_draft_to_approved() {
    let w = world();
    fill_required(&w).await;

    let view = SubmissionService::submit(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
    )
    .await
    .unwrap();
    assert_eq!(view.status, SubmissionStatus::Pending);
    assert!(view.submitted_at.is_some());

    let view = SubmissionService::approve(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.sector_admin,
        key(&w),
    )
    .await
    .unwrap();
    assert_eq!(view.status, SubmissionStatus::Approved);
}

#[tokio::test]
async fn reject_then_reset_round_trip() {
    let w = world();
    fill_required(&w).await;
    SubmissionService::submit(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
    )
    .await
    .unwrap();

    let view = SubmissionService::reject(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.region_admin,
        key(&w),
        "Enrolment looks implausible".to_string(),
    )
    .await
    .unwrap();
    assert_eq!(view.status, SubmissionStatus::Rejected);
    assert_eq!(
        view.rejection_reason.as_deref(),
        Some("Enrolment looks implausible")
    );

    // Owner amends the value while rejected, then resets to draft.
    let view = SubmissionService::write_value(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
        WriteValueDto {
            column_id: w.enrolment.id,
            value: "260".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(view.status, SubmissionStatus::Rejected);

    let view = SubmissionService::reset(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
    )
    .await
    .unwrap();
    assert_eq!(view.status, SubmissionStatus::Draft);
    assert_eq!(view.rejection_reason, None);
    // Values survive the reset.
    assert_eq!(view.values.get(&w.enrolment.id).map(String::as_str), Some("260"));

    // And the cycle can complete again.
    SubmissionService::submit(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
    )
    .await
    .unwrap();
    let view = SubmissionService::approve(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.superadmin,
        key(&w),
    )
    .await
    .unwrap();
    assert_eq!(view.status, SubmissionStatus::Approved);
}

#[tokio::test]
async fn double_approve_loses_cleanly() {
    let w = world();
    fill_required(&w).await;
    SubmissionService::submit(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
    )
    .await
    .unwrap();

    SubmissionService::approve(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.sector_admin,
        key(&w),
    )
    .await
    .unwrap();

    let err = SubmissionService::approve(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.region_admin,
        key(&w),
    )
    .await
    .unwrap_err();

    match err {
        WorkflowError::InvalidTransition { from, to } => {
            assert_eq!(from, "approved");
            assert_eq!(to, "approved");
        }
        other => panic!("expected InvalidTransition, got {other}"),
    }
}

#[tokio::test]
async fn pending_submission_is_locked_for_everyone() {
    let w = world();
    fill_required(&w).await;
    SubmissionService::submit(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
    )
    .await
    .unwrap();

    // Even the owner is denied while the submission awaits review.
    let err = SubmissionService::write_value(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
        WriteValueDto {
            column_id: w.enrolment.id,
            value: "999".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);

    // Once approved, editing is a status conflict instead.
    SubmissionService::approve(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.sector_admin,
        key(&w),
    )
    .await
    .unwrap();
    let err = SubmissionService::write_value(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
        WriteValueDto {
            column_id: w.enrolment.id,
            value: "999".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn approve_on_missing_submission_is_not_found() {
    let w = world();
    let err = SubmissionService::approve(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.sector_admin,
        key(&w),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));

    let err = SubmissionService::reset(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
}

#[tokio::test]
async fn submit_is_reserved_for_the_owning_school() {
    let w = world();
    fill_required(&w).await;

    // Superadmin can approve anything but cannot submit on a school's
    // behalf.
    let err = SubmissionService::submit(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.superadmin,
        key(&w),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WorkflowError::AccessDenied(_)));

    let err = SubmissionService::submit(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.sector_admin,
        key(&w),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WorkflowError::AccessDenied(_)));
}

#[tokio::test]
async fn racing_approvers_get_exactly_one_win() {
    let w = world();
    fill_required(&w).await;
    SubmissionService::submit(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
    )
    .await
    .unwrap();

    let mut handles = Vec::new();
    for approver in [w.sector_admin.clone(), w.region_admin.clone()] {
        let store = w.store.clone();
        let submission_key = key(&w);
        handles.push(tokio::spawn(async move {
            SubmissionService::approve(
                store.as_ref(),
                store.as_ref(),
                store.as_ref(),
                &approver,
                submission_key,
            )
            .await
        }));
    }

    let mut wins = 0;
    let mut losses = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(view) => {
                assert_eq!(view.status, SubmissionStatus::Approved);
                wins += 1;
            }
            Err(WorkflowError::InvalidTransition { from, .. }) => {
                assert_eq!(from, "approved");
                losses += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!((wins, losses), (1, 1));
}

#[tokio::test]
async fn approver_outside_scope_denied() {
    let w = world();
    fill_required(&w).await;
    SubmissionService::submit(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
    )
    .await
    .unwrap();

    // The other region's admin is an approver, but the school is outside
    // their scope.
    let other_region_admin = w.store.add_principal(
        "south@formline.test",
        formline_models::roles::Role::RegionAdmin(w.other_region.id),
    );
    let err = SubmissionService::approve(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &other_region_admin,
        key(&w),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WorkflowError::AccessDenied(_)));
}

#[tokio::test]
async fn school_admin_cannot_approve_own_submission() {
    let w = world();
    fill_required(&w).await;
    SubmissionService::submit(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
    )
    .await
    .unwrap();

    let err = SubmissionService::approve(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        key(&w),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WorkflowError::AccessDenied(_)));
}

#[tokio::test]
async fn foreign_school_admin_cannot_write() {
    let w = world();
    let result = SubmissionService::write_value(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.other_school_admin,
        key(&w),
        WriteValueDto {
            column_id: w.enrolment.id,
            value: "1".to_string(),
        },
    )
    .await;
    assert!(result.is_err());
}
