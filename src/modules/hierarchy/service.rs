//! Read-only views over the Region -> Sector -> School tree.
//!
//! Every listing is filtered to the caller's scope before it leaves this
//! module, so controllers never see rows the principal cannot read.

use tracing::instrument;

use formline_core::AppError;
use formline_models::hierarchy::{Region, School, Sector};
use formline_models::ids::{RegionId, SchoolId, SectorId};
use formline_models::roles::{Principal, Role};

use crate::modules::access::service::PermissionService;
use crate::store::HierarchyStore;

pub struct HierarchyService;

impl HierarchyService {
    /// List the regions the caller's scope contains. Sector and school
    /// admins contain no region, so they see an empty list.
    #[instrument(skip(store, principal), fields(role = %principal.role))]
    pub async fn list_regions(
        store: &dyn HierarchyStore,
        principal: &Principal,
    ) -> Result<Vec<Region>, AppError> {
        let regions = store.regions().await?;
        Ok(regions
            .into_iter()
            .filter(|r| PermissionService::scope_contains_region(&principal.role, r.id))
            .collect())
    }

    pub async fn get_region(
        store: &dyn HierarchyStore,
        principal: &Principal,
        id: RegionId,
    ) -> Result<Region, AppError> {
        let region = store
            .region(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Region not found")))?;

        if !PermissionService::scope_contains_region(&principal.role, id) {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Region is outside your scope"
            )));
        }
        Ok(region)
    }

    #[instrument(skip(store, principal), fields(role = %principal.role))]
    pub async fn list_sectors(
        store: &dyn HierarchyStore,
        principal: &Principal,
        region_filter: Option<RegionId>,
    ) -> Result<Vec<Sector>, AppError> {
        let sectors = match &principal.role {
            Role::SuperAdmin => store.sectors(region_filter).await?,
            Role::RegionAdmin(region_id) => {
                if region_filter.is_some_and(|f| f != *region_id) {
                    return Err(AppError::forbidden(anyhow::anyhow!(
                        "Region is outside your scope"
                    )));
                }
                store.sectors(Some(*region_id)).await?
            }
            Role::SectorAdmin(sector_id) => {
                let sector = store
                    .sector(*sector_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Sector not found")))?;
                if region_filter.is_some_and(|f| f != sector.region_id) {
                    return Err(AppError::forbidden(anyhow::anyhow!(
                        "Region is outside your scope"
                    )));
                }
                vec![sector]
            }
            // A school admin's scope contains no sector.
            Role::SchoolAdmin(_) => Vec::new(),
        };
        Ok(sectors)
    }

    pub async fn get_sector(
        store: &dyn HierarchyStore,
        principal: &Principal,
        id: SectorId,
    ) -> Result<Sector, AppError> {
        let sector = store
            .sector(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Sector not found")))?;
        if !PermissionService::scope_contains_sector(&principal.role, &sector) {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Sector is outside your scope"
            )));
        }
        Ok(sector)
    }

    #[instrument(skip(store, principal), fields(role = %principal.role))]
    pub async fn list_schools(
        store: &dyn HierarchyStore,
        principal: &Principal,
        sector_filter: Option<SectorId>,
    ) -> Result<Vec<School>, AppError> {
        match &principal.role {
            Role::SuperAdmin => Ok(store.schools(sector_filter).await?),
            Role::RegionAdmin(region_id) => {
                if let Some(sector_id) = sector_filter {
                    let sector = store
                        .sector(sector_id)
                        .await?
                        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Sector not found")))?;
                    if sector.region_id != *region_id {
                        return Err(AppError::forbidden(anyhow::anyhow!(
                            "Sector is outside your scope"
                        )));
                    }
                    return Ok(store.schools(Some(sector_id)).await?);
                }
                let mut schools = Vec::new();
                for sector in store.sectors(Some(*region_id)).await? {
                    schools.extend(store.schools(Some(sector.id)).await?);
                }
                Ok(schools)
            }
            Role::SectorAdmin(sector_id) => {
                if sector_filter.is_some_and(|f| f != *sector_id) {
                    return Err(AppError::forbidden(anyhow::anyhow!(
                        "Sector is outside your scope"
                    )));
                }
                Ok(store.schools(Some(*sector_id)).await?)
            }
            Role::SchoolAdmin(school_id) => {
                let school = store
                    .school(*school_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(anyhow::anyhow!("School not found")))?;
                if sector_filter.is_some_and(|f| f != school.sector_id) {
                    return Err(AppError::forbidden(anyhow::anyhow!(
                        "Sector is outside your scope"
                    )));
                }
                Ok(vec![school])
            }
        }
    }

    pub async fn get_school(
        store: &dyn HierarchyStore,
        principal: &Principal,
        id: SchoolId,
    ) -> Result<School, AppError> {
        let school = store
            .school(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("School not found")))?;
        let ancestors = store
            .school_ancestors(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("School not found")))?;
        if !PermissionService::scope_contains_school(&principal.role, id, &ancestors) {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "School is outside your scope"
            )));
        }
        Ok(school)
    }
}
