mod common;

use common::world;
use formline::modules::access::model::{AccessLevel, EntityKind};
use formline::modules::access::service::PermissionService;
use formline_models::categories::CategoryAssignment;
use uuid::Uuid;

#[tokio::test]
async fn superadmin_granted_everywhere() {
    let w = world();
    for kind in [EntityKind::Region, EntityKind::Sector, EntityKind::School] {
        let entity_id = match kind {
            EntityKind::Region => *w.other_region.id.as_uuid(),
            EntityKind::Sector => *w.other_sector.id.as_uuid(),
            _ => *w.other_school.id.as_uuid(),
        };
        let decision = PermissionService::check_access(
            w.store.as_ref(),
            w.store.as_ref(),
            &w.superadmin,
            kind,
            entity_id,
            AccessLevel::Admin,
        )
        .await
        .unwrap();
        assert!(decision.granted, "superadmin denied on {kind:?}");
    }
}

#[tokio::test]
async fn region_admin_contains_descendant_school() {
    let w = world();
    let decision = PermissionService::check_access(
        w.store.as_ref(),
        w.store.as_ref(),
        &w.region_admin,
        EntityKind::School,
        *w.school.id.as_uuid(),
        AccessLevel::Write,
    )
    .await
    .unwrap();
    assert!(decision.granted);
}

#[tokio::test]
async fn region_admin_denied_on_foreign_school() {
    let w = world();
    let decision = PermissionService::check_access(
        w.store.as_ref(),
        w.store.as_ref(),
        &w.region_admin,
        EntityKind::School,
        *w.other_school.id.as_uuid(),
        AccessLevel::Read,
    )
    .await
    .unwrap();
    assert!(!decision.granted);
    assert!(!decision.reason.is_empty());
}

#[tokio::test]
async fn school_admin_never_contains_its_sector() {
    let w = world();
    let decision = PermissionService::check_access(
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        EntityKind::Sector,
        *w.sector.id.as_uuid(),
        AccessLevel::Read,
    )
    .await
    .unwrap();
    assert!(!decision.granted);
}

#[tokio::test]
async fn admin_level_reserved_for_superadmin() {
    let w = world();
    let decision = PermissionService::check_access(
        w.store.as_ref(),
        w.store.as_ref(),
        &w.region_admin,
        EntityKind::Region,
        *w.region.id.as_uuid(),
        AccessLevel::Admin,
    )
    .await
    .unwrap();
    assert!(!decision.granted);
}

#[tokio::test]
async fn missing_entity_is_an_error_not_a_denial() {
    let w = world();
    let result = PermissionService::check_access(
        w.store.as_ref(),
        w.store.as_ref(),
        &w.region_admin,
        EntityKind::School,
        Uuid::new_v4(),
        AccessLevel::Read,
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn sector_assigned_category_hidden_from_school_admin() {
    let w = world();
    let sector_category = w
        .store
        .add_category("Sector statistics", CategoryAssignment::Sectors);

    let decision = PermissionService::check_access(
        w.store.as_ref(),
        w.store.as_ref(),
        &w.school_admin,
        EntityKind::Category,
        *sector_category.id.as_uuid(),
        AccessLevel::Read,
    )
    .await
    .unwrap();
    assert!(!decision.granted);

    let decision = PermissionService::check_access(
        w.store.as_ref(),
        w.store.as_ref(),
        &w.sector_admin,
        EntityKind::Category,
        *sector_category.id.as_uuid(),
        AccessLevel::Read,
    )
    .await
    .unwrap();
    assert!(decision.granted);
}

#[tokio::test]
async fn category_write_limited_to_schema_managers() {
    let w = world();
    let id = *w.category.id.as_uuid();

    for (principal, expected) in [
        (&w.superadmin, true),
        (&w.region_admin, true),
        (&w.sector_admin, false),
        (&w.school_admin, false),
    ] {
        let decision = PermissionService::check_access(
            w.store.as_ref(),
            w.store.as_ref(),
            principal,
            EntityKind::Category,
            id,
            AccessLevel::Write,
        )
        .await
        .unwrap();
        assert_eq!(
            decision.granted, expected,
            "unexpected write decision for {}",
            principal.role
        );
    }
}
