//! Role and principal domain models.
//!
//! The role system is a closed set of four roles, each bound to one level of
//! the Region → Sector → School hierarchy. A role carries its scope id by
//! construction, so a "sectoradmin without a sector" or a "schooladmin with a
//! region id" cannot exist as a value. All role parsing goes through
//! [`Role::from_parts`], which enforces the exactly-one-scope invariant.

use crate::ids::{RegionId, SchoolId, SectorId, UserId};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// A role tag plus the scope entity it is bound to.
///
/// `SuperAdmin` has no scope and contains the whole hierarchy. The other
/// three are scoped to exactly one entity at their level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SuperAdmin,
    RegionAdmin(RegionId),
    SectorAdmin(SectorId),
    SchoolAdmin(SchoolId),
}

/// Error produced when a role tag and its scope fields are inconsistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleParseError {
    /// The role tag is not one of the four known roles.
    UnknownRole(String),
    /// The scope field required by the role tag is missing.
    MissingScope(&'static str),
    /// A scope field that must be empty for this role tag is populated.
    ExtraScope(&'static str),
}

impl fmt::Display for RoleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRole(tag) => write!(f, "Unknown role: {}", tag),
            Self::MissingScope(field) => write!(f, "Role requires {} to be set", field),
            Self::ExtraScope(field) => write!(f, "Role does not allow {} to be set", field),
        }
    }
}

impl std::error::Error for RoleParseError {}

impl Role {
    /// Parse a role tag and its scope fields into a `Role`.
    ///
    /// Exactly one scope field must be populated, and it must be the one the
    /// tag requires (`superadmin` requires all three to be empty).
    pub fn from_parts(
        tag: &str,
        region_id: Option<RegionId>,
        sector_id: Option<SectorId>,
        school_id: Option<SchoolId>,
    ) -> Result<Self, RoleParseError> {
        let forbid = |field: Option<()>, name: &'static str| match field {
            Some(_) => Err(RoleParseError::ExtraScope(name)),
            None => Ok(()),
        };

        match tag {
            "superadmin" => {
                forbid(region_id.map(|_| ()), "region_id")?;
                forbid(sector_id.map(|_| ()), "sector_id")?;
                forbid(school_id.map(|_| ()), "school_id")?;
                Ok(Self::SuperAdmin)
            }
            "regionadmin" => {
                forbid(sector_id.map(|_| ()), "sector_id")?;
                forbid(school_id.map(|_| ()), "school_id")?;
                region_id
                    .map(Self::RegionAdmin)
                    .ok_or(RoleParseError::MissingScope("region_id"))
            }
            "sectoradmin" => {
                forbid(region_id.map(|_| ()), "region_id")?;
                forbid(school_id.map(|_| ()), "school_id")?;
                sector_id
                    .map(Self::SectorAdmin)
                    .ok_or(RoleParseError::MissingScope("sector_id"))
            }
            "schooladmin" => {
                forbid(region_id.map(|_| ()), "region_id")?;
                forbid(sector_id.map(|_| ()), "sector_id")?;
                school_id
                    .map(Self::SchoolAdmin)
                    .ok_or(RoleParseError::MissingScope("school_id"))
            }
            other => Err(RoleParseError::UnknownRole(other.to_string())),
        }
    }

    /// The wire tag for this role.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "superadmin",
            Self::RegionAdmin(_) => "regionadmin",
            Self::SectorAdmin(_) => "sectoradmin",
            Self::SchoolAdmin(_) => "schooladmin",
        }
    }

    /// Scope fields in token/row order: (region_id, sector_id, school_id).
    pub fn scope_parts(&self) -> (Option<RegionId>, Option<SectorId>, Option<SchoolId>) {
        match self {
            Self::SuperAdmin => (None, None, None),
            Self::RegionAdmin(id) => (Some(*id), None, None),
            Self::SectorAdmin(id) => (None, Some(*id), None),
            Self::SchoolAdmin(id) => (None, None, Some(*id)),
        }
    }

    pub fn is_superadmin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Roles allowed to approve or reject pending submissions.
    pub fn is_approver(&self) -> bool {
        matches!(
            self,
            Self::SuperAdmin | Self::RegionAdmin(_) | Self::SectorAdmin(_)
        )
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// An authenticated actor: identity plus a scope-bound role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }
}

/// Serializable snapshot of a principal, returned by the session endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrincipalView {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub region_id: Option<RegionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub sector_id: Option<SectorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub school_id: Option<SchoolId>,
}

impl From<&Principal> for PrincipalView {
    fn from(principal: &Principal) -> Self {
        let (region_id, sector_id, school_id) = principal.role.scope_parts();
        Self {
            id: principal.id,
            email: principal.email.clone(),
            role: principal.role.tag().to_string(),
            region_id,
            sector_id,
            school_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_valid_roles() {
        assert_eq!(
            Role::from_parts("superadmin", None, None, None),
            Ok(Role::SuperAdmin)
        );

        let region = RegionId::new();
        assert_eq!(
            Role::from_parts("regionadmin", Some(region), None, None),
            Ok(Role::RegionAdmin(region))
        );

        let sector = SectorId::new();
        assert_eq!(
            Role::from_parts("sectoradmin", None, Some(sector), None),
            Ok(Role::SectorAdmin(sector))
        );

        let school = SchoolId::new();
        assert_eq!(
            Role::from_parts("schooladmin", None, None, Some(school)),
            Ok(Role::SchoolAdmin(school))
        );
    }

    #[test]
    fn test_from_parts_missing_scope() {
        assert_eq!(
            Role::from_parts("regionadmin", None, None, None),
            Err(RoleParseError::MissingScope("region_id"))
        );
        assert_eq!(
            Role::from_parts("schooladmin", None, None, None),
            Err(RoleParseError::MissingScope("school_id"))
        );
    }

    #[test]
    fn test_from_parts_extra_scope() {
        let sector = SectorId::new();
        let school = SchoolId::new();

        // Two scope fields populated at once
        assert_eq!(
            Role::from_parts("sectoradmin", None, Some(sector), Some(school)),
            Err(RoleParseError::ExtraScope("school_id"))
        );

        // Superadmin must not carry any scope
        assert_eq!(
            Role::from_parts("superadmin", None, None, Some(school)),
            Err(RoleParseError::ExtraScope("school_id"))
        );
    }

    #[test]
    fn test_from_parts_unknown_role() {
        assert!(matches!(
            Role::from_parts("SuperAdmin", None, None, None),
            Err(RoleParseError::UnknownRole(_))
        ));
        assert!(matches!(
            Role::from_parts("teacher", None, None, None),
            Err(RoleParseError::UnknownRole(_))
        ));
    }

    #[test]
    fn test_tag_round_trip() {
        let school = SchoolId::new();
        let role = Role::SchoolAdmin(school);
        let (region_id, sector_id, school_id) = role.scope_parts();
        assert_eq!(
            Role::from_parts(role.tag(), region_id, sector_id, school_id),
            Ok(role)
        );
    }

    #[test]
    fn test_is_approver() {
        assert!(Role::SuperAdmin.is_approver());
        assert!(Role::RegionAdmin(RegionId::new()).is_approver());
        assert!(Role::SectorAdmin(SectorId::new()).is_approver());
        assert!(!Role::SchoolAdmin(SchoolId::new()).is_approver());
    }
}
