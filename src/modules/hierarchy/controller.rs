use crate::middleware::auth::AuthUser;
use crate::modules::hierarchy::model::{SchoolFilterParams, SectorFilterParams};
use crate::modules::hierarchy::service::HierarchyService;
use crate::modules::session::controller::ErrorResponse;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use formline_core::AppError;
use formline_models::hierarchy::{Region, School, Sector};
use formline_models::ids::{RegionId, SchoolId, SectorId};
use tracing::instrument;

/// List regions visible to the authenticated principal
#[utoipa::path(
    get,
    path = "/api/regions",
    responses(
        (status = 200, description = "Regions within scope", body = Vec<Region>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn get_regions(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<Region>>, AppError> {
    let regions = HierarchyService::list_regions(state.hierarchy.as_ref(), &principal).await?;
    Ok(Json(regions))
}

/// Get a single region
#[utoipa::path(
    get,
    path = "/api/regions/{id}",
    params(("id" = RegionId, Path, description = "Region id")),
    responses(
        (status = 200, description = "Region", body = Region),
        (status = 403, description = "Region outside scope", body = ErrorResponse),
        (status = 404, description = "Region not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn get_region(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<RegionId>,
) -> Result<Json<Region>, AppError> {
    let region = HierarchyService::get_region(state.hierarchy.as_ref(), &principal, id).await?;
    Ok(Json(region))
}

/// List sectors visible to the authenticated principal
#[utoipa::path(
    get,
    path = "/api/sectors",
    params(SectorFilterParams),
    responses(
        (status = 200, description = "Sectors within scope", body = Vec<Sector>),
        (status = 403, description = "Requested region outside scope", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn get_sectors(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(params): Query<SectorFilterParams>,
) -> Result<Json<Vec<Sector>>, AppError> {
    let sectors =
        HierarchyService::list_sectors(state.hierarchy.as_ref(), &principal, params.region_id)
            .await?;
    Ok(Json(sectors))
}

/// Get a single sector
#[utoipa::path(
    get,
    path = "/api/sectors/{id}",
    params(("id" = SectorId, Path, description = "Sector id")),
    responses(
        (status = 200, description = "Sector", body = Sector),
        (status = 403, description = "Sector outside scope", body = ErrorResponse),
        (status = 404, description = "Sector not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn get_sector(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<SectorId>,
) -> Result<Json<Sector>, AppError> {
    let sector = HierarchyService::get_sector(state.hierarchy.as_ref(), &principal, id).await?;
    Ok(Json(sector))
}

/// List schools visible to the authenticated principal
#[utoipa::path(
    get,
    path = "/api/schools",
    params(SchoolFilterParams),
    responses(
        (status = 200, description = "Schools within scope", body = Vec<School>),
        (status = 403, description = "Requested sector outside scope", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn get_schools(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(params): Query<SchoolFilterParams>,
) -> Result<Json<Vec<School>>, AppError> {
    let schools =
        HierarchyService::list_schools(state.hierarchy.as_ref(), &principal, params.sector_id)
            .await?;
    Ok(Json(schools))
}

/// Get a single school
#[utoipa::path(
    get,
    path = "/api/schools/{id}",
    params(("id" = SchoolId, Path, description = "School id")),
    responses(
        (status = 200, description = "School", body = School),
        (status = 403, description = "School outside scope", body = ErrorResponse),
        (status = 404, description = "School not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Hierarchy"
)]
#[instrument(skip(state))]
pub async fn get_school(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<SchoolId>,
) -> Result<Json<School>, AppError> {
    let school = HierarchyService::get_school(state.hierarchy.as_ref(), &principal, id).await?;
    Ok(Json(school))
}
