mod common;

use common::{World, world};
use formline::modules::approvals::model::{BulkAction, BulkOutcome, BulkRequest, QueueParams};
use formline::modules::approvals::service::ApprovalService;
use formline_models::submissions::{SubmissionKey, SubmissionStatus};

fn seeded_pending(w: &World, school_name: &str) -> SubmissionKey {
    let school = w.store.add_school(school_name, w.sector.id);
    let key = SubmissionKey::new(school.id, w.category.id);
    w.store.seed_submission(
        key,
        SubmissionStatus::Pending,
        vec![(w.enrolment.id, "100"), (w.contact.id, "a@b.test")],
    );
    key
}

#[tokio::test]
async fn bulk_outcomes_are_positional_and_independent() {
    let w = world();

    // items: [pending ok, pending ok, already approved, out of scope, missing]
    let ok_one = seeded_pending(&w, "North A-2");
    let ok_two = seeded_pending(&w, "North A-3");

    let approved = SubmissionKey::new(w.school.id, w.category.id);
    w.store.seed_submission(
        approved,
        SubmissionStatus::Approved,
        vec![(w.enrolment.id, "1"), (w.contact.id, "x@y.test")],
    );

    let foreign = SubmissionKey::new(w.other_school.id, w.category.id);
    w.store.seed_submission(
        foreign,
        SubmissionStatus::Pending,
        vec![(w.enrolment.id, "2"), (w.contact.id, "z@y.test")],
    );

    let missing = SubmissionKey::new(
        w.store.add_school("North A-4", w.sector.id).id,
        w.category.id,
    );

    let request = BulkRequest {
        action: BulkAction::Approve,
        reason: None,
        items: vec![ok_one, ok_two, approved, foreign, missing],
    };

    let response = ApprovalService::bulk_transition(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.sector_admin,
        request,
    )
    .await
    .unwrap();

    assert_eq!(response.results.len(), 5);
    assert_eq!(response.succeeded, 2);
    assert_eq!(response.failed, 3);

    assert_eq!(response.results[0].outcome, BulkOutcome::Success);
    assert_eq!(response.results[1].outcome, BulkOutcome::Success);
    assert!(matches!(
        response.results[2].outcome,
        BulkOutcome::InvalidTransition { ref from } if from == "approved"
    ));
    assert!(matches!(
        response.results[3].outcome,
        BulkOutcome::Denied { .. }
    ));
    assert!(matches!(response.results[4].outcome, BulkOutcome::Error { .. }));

    // Positional correspondence with the request items.
    assert_eq!(response.results[0].key, ok_one);
    assert_eq!(response.results[3].key, foreign);
}

#[tokio::test]
async fn bulk_reject_requires_reason() {
    let w = world();
    let key = seeded_pending(&w, "North A-2");

    let request = BulkRequest {
        action: BulkAction::Reject,
        reason: None,
        items: vec![key],
    };
    let err = ApprovalService::bulk_transition(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.sector_admin,
        request,
    )
    .await;
    assert!(err.is_err());
}

#[tokio::test]
async fn bulk_reject_applies_reason_to_every_item() {
    let w = world();
    let one = seeded_pending(&w, "North A-2");
    let two = seeded_pending(&w, "North A-3");

    let request = BulkRequest {
        action: BulkAction::Reject,
        reason: Some("Quarter closed".to_string()),
        items: vec![one, two],
    };
    let response = ApprovalService::bulk_transition(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.region_admin,
        request,
    )
    .await
    .unwrap();
    assert_eq!(response.succeeded, 2);

    use formline::store::SubmissionStore;
    for key in [one, two] {
        let submission = w.store.submission(key).await.unwrap().unwrap();
        assert_eq!(submission.status, SubmissionStatus::Rejected);
        assert_eq!(submission.rejection_reason.as_deref(), Some("Quarter closed"));
    }
}

#[tokio::test]
async fn non_approver_cannot_bulk_decide() {
    let w = world();
    let key = seeded_pending(&w, "North A-2");

    let request = BulkRequest {
        action: BulkAction::Approve,
        reason: None,
        items: vec![key],
    };
    let result = ApprovalService::bulk_transition(
        w.store.as_ref(),
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        request,
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn queue_is_scope_filtered_and_ordered() {
    let w = world();
    let own = seeded_pending(&w, "North A-2");
    let foreign = SubmissionKey::new(w.other_school.id, w.category.id);
    w.store.seed_submission(
        foreign,
        SubmissionStatus::Pending,
        vec![(w.enrolment.id, "2"), (w.contact.id, "z@y.test")],
    );

    let items = ApprovalService::list_queue(
        w.store.as_ref(),
        w.store.as_ref(),
        &w.sector_admin,
        QueueParams {
            status: Some(SubmissionStatus::Pending),
            category_id: None,
            school_id: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].key, own);
    assert_eq!(items[0].completion_percentage, 100);
    assert_eq!(items[0].category_name, "School profile");
}

#[tokio::test]
async fn queue_school_filter_outside_scope_is_denied() {
    let w = world();
    let result = ApprovalService::list_queue(
        w.store.as_ref(),
        w.store.as_ref(),
        &w.sector_admin,
        QueueParams {
            status: None,
            category_id: None,
            school_id: Some(w.other_school.id),
        },
    )
    .await;
    assert!(result.is_err());
}
