//! Category and column domain models.
//!
//! A category groups typed columns into one data-entry form. The
//! `assignment` tag controls which roles can see it: `Sectors`-assigned
//! categories are collected about sectors and are invisible to school admins.

use crate::ids::{CategoryId, ColumnId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::hierarchy::EntityStatus;

/// Which part of the hierarchy a category applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "category_assignment", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CategoryAssignment {
    All,
    Sectors,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub assignment: CategoryAssignment,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "column_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Date,
    Email,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Column {
    pub id: ColumnId,
    pub category_id: CategoryId,
    pub name: String,
    pub column_type: ColumnType,
    pub required: bool,
    pub max_length: Option<i32>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub assignment: CategoryAssignment,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub assignment: Option<CategoryAssignment>,
    pub status: Option<EntityStatus>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct CategoryFilterParams {
    pub name: Option<String>,
    pub assignment: Option<CategoryAssignment>,
    #[serde(flatten)]
    pub pagination: formline_core::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedCategoriesResponse {
    pub data: Vec<Category>,
    pub meta: formline_core::PaginationMeta,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateColumnDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default)]
    pub required: bool,
    #[validate(range(min = 1))]
    pub max_length: Option<i32>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}
