//! Hierarchy domain models: Region → Sector → School.
//!
//! Entities are read-mostly from the API's perspective; administrative CRUD
//! lives outside this service. A sector belongs to exactly one region and a
//! school to exactly one sector for their lifetimes, so ancestor resolution
//! never changes under a caller mid-request.

use crate::ids::{RegionId, SchoolId, SectorId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Activity status shared by all hierarchy entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "entity_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Sector {
    pub id: SectorId,
    pub name: String,
    pub region_id: RegionId,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    pub sector_id: SectorId,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolved ancestors of a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Ancestors {
    #[schema(value_type = String, format = "uuid")]
    pub sector_id: SectorId,
    #[schema(value_type = String, format = "uuid")]
    pub region_id: RegionId,
}
