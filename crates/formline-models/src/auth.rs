//! Authentication claim structures.
//!
//! Token issuance is handled by the external auth layer; this crate only
//! defines the claims shape the API consumes. The role tag plus at most one
//! scope field resolve into a [`crate::roles::Role`] at extraction time.

use crate::ids::{RegionId, SchoolId, SectorId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    /// Role tag: superadmin | regionadmin | sectoradmin | schooladmin
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<RegionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_id: Option<SectorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<SchoolId>,
    pub exp: usize,
    pub iat: usize,
}
