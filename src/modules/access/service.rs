//! The permission evaluator.
//!
//! Single authoritative decision point for "can principal P perform action A
//! on entity E". Every call site in the codebase goes through this module;
//! nothing re-derives role comparisons ad hoc.
//!
//! The evaluator is referentially transparent given the same hierarchy
//! snapshot and principal: it performs store reads but never writes, so its
//! results are cacheable by callers.

use tracing::{debug, instrument};
use uuid::Uuid;

use formline_core::{AppError, WorkflowError};
use formline_models::categories::CategoryAssignment;
use formline_models::hierarchy::{Ancestors, Sector};
use formline_models::ids::{CategoryId, ColumnId, RegionId, SchoolId, SectorId};
use formline_models::roles::{Principal, Role};

use crate::modules::access::model::{AccessLevel, Decision, EntityKind};
use crate::store::{CategoryStore, HierarchyStore};

pub struct PermissionService;

impl PermissionService {
    /// Whether `level` is within the role's ceiling. `Admin` is reserved for
    /// superadmin; every scoped role tops out at `Write` inside its scope.
    pub fn level_within_ceiling(role: &Role, level: AccessLevel) -> bool {
        match role {
            Role::SuperAdmin => true,
            _ => level != AccessLevel::Admin,
        }
    }

    /// Ancestor-containment for a school target.
    pub fn scope_contains_school(role: &Role, school_id: SchoolId, ancestors: &Ancestors) -> bool {
        match role {
            Role::SuperAdmin => true,
            Role::RegionAdmin(region_id) => *region_id == ancestors.region_id,
            Role::SectorAdmin(sector_id) => *sector_id == ancestors.sector_id,
            Role::SchoolAdmin(own_school) => *own_school == school_id,
        }
    }

    /// Ancestor-containment for a sector target. A school admin's scope
    /// never contains a sector, not even their own sector.
    pub fn scope_contains_sector(role: &Role, sector: &Sector) -> bool {
        match role {
            Role::SuperAdmin => true,
            Role::RegionAdmin(region_id) => *region_id == sector.region_id,
            Role::SectorAdmin(sector_id) => *sector_id == sector.id,
            Role::SchoolAdmin(_) => false,
        }
    }

    /// Containment for a region target.
    pub fn scope_contains_region(role: &Role, region_id: RegionId) -> bool {
        match role {
            Role::SuperAdmin => true,
            Role::RegionAdmin(own_region) => *own_region == region_id,
            Role::SectorAdmin(_) | Role::SchoolAdmin(_) => false,
        }
    }

    /// Category schema management (create/update categories and columns).
    pub fn can_manage_categories(role: &Role) -> bool {
        matches!(role, Role::SuperAdmin | Role::RegionAdmin(_))
    }

    /// Read access to sector-assigned categories.
    pub fn can_view_sector_categories(role: &Role) -> bool {
        matches!(
            role,
            Role::SuperAdmin | Role::RegionAdmin(_) | Role::SectorAdmin(_)
        )
    }

    /// Whether a category with the given assignment is visible to the role.
    pub fn category_visible_to(role: &Role, assignment: CategoryAssignment) -> bool {
        match assignment {
            CategoryAssignment::All => true,
            CategoryAssignment::Sectors => Self::can_view_sector_categories(role),
        }
    }

    /// Evaluate an access request against a typed entity.
    ///
    /// Missing entities produce `Err(NotFound)`, never a denial.
    #[instrument(skip(hierarchy, categories, principal), fields(principal.role = %principal.role))]
    pub async fn check_access(
        hierarchy: &dyn HierarchyStore,
        categories: &dyn CategoryStore,
        principal: &Principal,
        kind: EntityKind,
        entity_id: Uuid,
        level: AccessLevel,
    ) -> Result<Decision, AppError> {
        let role = &principal.role;

        if role.is_superadmin() {
            return Ok(Decision::granted("superadmin"));
        }

        if !Self::level_within_ceiling(role, level) {
            debug!(level = %level.as_str(), "Level exceeds role ceiling");
            return Ok(Decision::denied(format!(
                "{} level requires superadmin",
                level.as_str()
            )));
        }

        let decision = match kind {
            EntityKind::Region => {
                let region_id = RegionId::from_uuid(entity_id);
                hierarchy
                    .region(region_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Region not found")))?;
                if Self::scope_contains_region(role, region_id) {
                    Decision::granted("region within scope")
                } else {
                    Decision::denied("region outside principal scope")
                }
            }
            EntityKind::Sector => {
                let sector = hierarchy
                    .sector(SectorId::from_uuid(entity_id))
                    .await?
                    .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Sector not found")))?;
                if Self::scope_contains_sector(role, &sector) {
                    Decision::granted("sector within scope")
                } else {
                    Decision::denied("sector outside principal scope")
                }
            }
            EntityKind::School => {
                let school_id = SchoolId::from_uuid(entity_id);
                let ancestors = hierarchy
                    .school_ancestors(school_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(anyhow::anyhow!("School not found")))?;
                if Self::scope_contains_school(role, school_id, &ancestors) {
                    Decision::granted("school within scope")
                } else {
                    Decision::denied("school outside principal scope")
                }
            }
            EntityKind::Category => {
                let category = categories
                    .category(CategoryId::from_uuid(entity_id))
                    .await?
                    .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Category not found")))?;
                Self::category_decision(role, category.assignment, level)
            }
            EntityKind::Column => {
                let column = categories
                    .column(ColumnId::from_uuid(entity_id))
                    .await?
                    .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Column not found")))?;
                let category = categories
                    .category(column.category_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Category not found")))?;
                Self::category_decision(role, category.assignment, level)
            }
        };

        Ok(decision)
    }

    fn category_decision(
        role: &Role,
        assignment: CategoryAssignment,
        level: AccessLevel,
    ) -> Decision {
        match level {
            AccessLevel::Read => {
                if Self::category_visible_to(role, assignment) {
                    Decision::granted("category visible to role")
                } else {
                    Decision::denied("sector-assigned category is not visible to this role")
                }
            }
            AccessLevel::Write | AccessLevel::Admin => {
                // Admin on non-superadmin is already rejected by the ceiling.
                if Self::can_manage_categories(role) {
                    Decision::granted("role may manage categories")
                } else {
                    Decision::denied("only superadmin and regionadmin manage categories")
                }
            }
        }
    }

    /// State-machine variant: resolve the school's ancestors and require a
    /// granted decision, collapsing denial into `WorkflowError::AccessDenied`.
    pub async fn require_school_access(
        hierarchy: &dyn HierarchyStore,
        principal: &Principal,
        school_id: SchoolId,
        level: AccessLevel,
    ) -> Result<Ancestors, WorkflowError> {
        let ancestors = hierarchy
            .school_ancestors(school_id)
            .await
            .map_err(WorkflowError::from)?
            .ok_or_else(|| WorkflowError::NotFound("School".to_string()))?;

        if !Self::level_within_ceiling(&principal.role, level) {
            return Err(WorkflowError::AccessDenied(format!(
                "{} level requires superadmin",
                level.as_str()
            )));
        }

        if !Self::scope_contains_school(&principal.role, school_id, &ancestors) {
            return Err(WorkflowError::AccessDenied(format!(
                "school {} is outside the {} scope",
                school_id,
                principal.role.tag()
            )));
        }

        Ok(ancestors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formline_models::ids::{RegionId, SectorId};

    fn ancestors(sector_id: SectorId, region_id: RegionId) -> Ancestors {
        Ancestors {
            sector_id,
            region_id,
        }
    }

    #[test]
    fn test_level_ceiling() {
        let school = SchoolId::new();
        assert!(PermissionService::level_within_ceiling(
            &Role::SuperAdmin,
            AccessLevel::Admin
        ));
        assert!(!PermissionService::level_within_ceiling(
            &Role::SchoolAdmin(school),
            AccessLevel::Admin
        ));
        assert!(PermissionService::level_within_ceiling(
            &Role::SchoolAdmin(school),
            AccessLevel::Write
        ));
    }

    #[test]
    fn test_scope_contains_school() {
        let region = RegionId::new();
        let sector = SectorId::new();
        let school = SchoolId::new();
        let a = ancestors(sector, region);

        assert!(PermissionService::scope_contains_school(
            &Role::SuperAdmin,
            school,
            &a
        ));
        assert!(PermissionService::scope_contains_school(
            &Role::RegionAdmin(region),
            school,
            &a
        ));
        assert!(PermissionService::scope_contains_school(
            &Role::SectorAdmin(sector),
            school,
            &a
        ));
        assert!(PermissionService::scope_contains_school(
            &Role::SchoolAdmin(school),
            school,
            &a
        ));

        // Foreign scopes
        assert!(!PermissionService::scope_contains_school(
            &Role::RegionAdmin(RegionId::new()),
            school,
            &a
        ));
        assert!(!PermissionService::scope_contains_school(
            &Role::SectorAdmin(SectorId::new()),
            school,
            &a
        ));
        assert!(!PermissionService::scope_contains_school(
            &Role::SchoolAdmin(SchoolId::new()),
            school,
            &a
        ));
    }

    #[test]
    fn test_category_visibility() {
        let school_admin = Role::SchoolAdmin(SchoolId::new());
        let sector_admin = Role::SectorAdmin(SectorId::new());

        assert!(PermissionService::category_visible_to(
            &school_admin,
            CategoryAssignment::All
        ));
        assert!(!PermissionService::category_visible_to(
            &school_admin,
            CategoryAssignment::Sectors
        ));
        assert!(PermissionService::category_visible_to(
            &sector_admin,
            CategoryAssignment::Sectors
        ));
    }

    #[test]
    fn test_manage_categories() {
        assert!(PermissionService::can_manage_categories(&Role::SuperAdmin));
        assert!(PermissionService::can_manage_categories(&Role::RegionAdmin(
            RegionId::new()
        )));
        assert!(!PermissionService::can_manage_categories(
            &Role::SectorAdmin(SectorId::new())
        ));
        assert!(!PermissionService::can_manage_categories(
            &Role::SchoolAdmin(SchoolId::new())
        ));
    }
}
