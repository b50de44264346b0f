use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Requested access level, ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Read,
    Write,
    Admin,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        }
    }
}

/// Kind of entity an access check targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Region,
    Sector,
    School,
    Category,
    Column,
}

/// Outcome of a permission check.
///
/// Denial is a first-class value, never an error: callers that get a
/// `Decision` could reach the evaluator and the evaluator could determine an
/// answer. Infrastructure failures and missing entities surface as errors
/// instead, so "not allowed" and "could not determine" stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Decision {
    pub granted: bool,
    pub reason: String,
}

impl Decision {
    pub fn granted(reason: impl Into<String>) -> Self {
        Self {
            granted: true,
            reason: reason.into(),
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            granted: false,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckAccessRequest {
    pub entity_kind: EntityKind,
    #[schema(value_type = String, format = "uuid")]
    pub entity_id: Uuid,
    pub level: AccessLevel,
}
