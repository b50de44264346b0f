//! # Formline Models
//!
//! Domain models and DTOs for the Formline API.
//!
//! This crate provides all data structures used throughout the Formline
//! application, including hierarchy entities, the scope-bound role model,
//! category/column schema types, and submission lifecycle types.
//!
//! # Modules
//!
//! - [`ids`]: Strongly-typed Uuid newtypes per entity
//! - [`auth`]: JWT claims consumed from the external auth layer
//! - [`roles`]: The closed `Role` enum and `Principal`
//! - [`hierarchy`]: Region / Sector / School entities
//! - [`categories`]: Category and typed column definitions
//! - [`submissions`]: Submission, status lifecycle, and queue DTOs
//!
//! # Example
//!
//! ```ignore
//! use formline_models::roles::Role;
//! use formline_models::ids::SchoolId;
//!
//! let role = Role::from_parts("schooladmin", None, None, Some(SchoolId::new()))?;
//! assert_eq!(role.tag(), "schooladmin");
//! ```

pub mod auth;
pub mod categories;
pub mod hierarchy;
pub mod ids;
pub mod roles;
pub mod submissions;

// Re-export commonly used types at crate root for convenience
pub use auth::Claims;

pub use ids::{CategoryId, ColumnId, RegionId, SchoolId, SectorId, UserId};

pub use roles::{Principal, PrincipalView, Role, RoleParseError};

pub use hierarchy::{Ancestors, EntityStatus, Region, School, Sector};

pub use categories::{
    Category, CategoryAssignment, CategoryFilterParams, Column, ColumnType, CreateCategoryDto,
    CreateColumnDto, PaginatedCategoriesResponse, UpdateCategoryDto,
};

pub use submissions::{
    QueueItem, RejectDto, Submission, SubmissionKey, SubmissionStatus, SubmissionView,
    WriteValueDto,
};
