use formline_models::ids::{RegionId, SectorId};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SectorFilterParams {
    /// Restrict to sectors under this region
    pub region_id: Option<RegionId>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SchoolFilterParams {
    /// Restrict to schools under this sector
    pub sector_id: Option<SectorId>,
}
