//! Category and column schema management.
//!
//! Schema writes are restricted to superadmin and regionadmin. Reads are
//! filtered by assignment: sector-assigned categories never appear in a
//! school admin's listing.

use chrono::Utc;
use tracing::{info, instrument};

use formline_core::{AppError, PaginationMeta};
use formline_models::categories::{
    Category, CategoryFilterParams, Column, CreateCategoryDto, CreateColumnDto,
    PaginatedCategoriesResponse, UpdateCategoryDto,
};
use formline_models::hierarchy::EntityStatus;
use formline_models::ids::{CategoryId, ColumnId};
use formline_models::roles::Principal;

use crate::modules::access::service::PermissionService;
use crate::store::CategoryStore;

pub struct CategoryService;

impl CategoryService {
    #[instrument(skip(store, principal), fields(role = %principal.role))]
    pub async fn list_categories(
        store: &dyn CategoryStore,
        principal: &Principal,
        params: CategoryFilterParams,
    ) -> Result<PaginatedCategoriesResponse, AppError> {
        let mut categories: Vec<Category> = store
            .categories()
            .await?
            .into_iter()
            .filter(|c| PermissionService::category_visible_to(&principal.role, c.assignment))
            .collect();

        if let Some(name) = &params.name {
            let needle = name.to_lowercase();
            categories.retain(|c| c.name.to_lowercase().contains(&needle));
        }
        if let Some(assignment) = params.assignment {
            categories.retain(|c| c.assignment == assignment);
        }

        let total = categories.len() as i64;
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();
        let page = params.pagination.page();

        let data: Vec<Category> = categories
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit as usize)
            .collect();

        let has_more = offset + (data.len() as i64) < total;
        Ok(PaginatedCategoriesResponse {
            data,
            meta: PaginationMeta {
                total,
                limit,
                offset: if page.is_none() { Some(offset) } else { None },
                page,
                has_more,
            },
        })
    }

    pub async fn get_category(
        store: &dyn CategoryStore,
        principal: &Principal,
        id: CategoryId,
    ) -> Result<Category, AppError> {
        let category = store
            .category(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Category not found")))?;
        if !PermissionService::category_visible_to(&principal.role, category.assignment) {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Category is not visible to your role"
            )));
        }
        Ok(category)
    }

    pub async fn get_columns(
        store: &dyn CategoryStore,
        principal: &Principal,
        category_id: CategoryId,
    ) -> Result<Vec<Column>, AppError> {
        // Visibility check rides on the category lookup.
        Self::get_category(store, principal, category_id).await?;
        Ok(store.columns(category_id).await?)
    }

    #[instrument(skip(store, principal, dto), fields(role = %principal.role))]
    pub async fn create_category(
        store: &dyn CategoryStore,
        principal: &Principal,
        dto: CreateCategoryDto,
    ) -> Result<Category, AppError> {
        Self::require_manage(principal)?;

        let now = Utc::now();
        let category = store
            .insert_category(Category {
                id: CategoryId::new(),
                name: dto.name,
                description: dto.description,
                assignment: dto.assignment,
                status: EntityStatus::Active,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    #[instrument(skip(store, principal, dto), fields(role = %principal.role))]
    pub async fn update_category(
        store: &dyn CategoryStore,
        principal: &Principal,
        id: CategoryId,
        dto: UpdateCategoryDto,
    ) -> Result<Category, AppError> {
        Self::require_manage(principal)?;

        let mut category = store
            .category(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Category not found")))?;

        if let Some(name) = dto.name {
            category.name = name;
        }
        if dto.description.is_some() {
            category.description = dto.description;
        }
        if let Some(assignment) = dto.assignment {
            category.assignment = assignment;
        }
        if let Some(status) = dto.status {
            category.status = status;
        }
        category.updated_at = Utc::now();

        Ok(store.update_category(category).await?)
    }

    #[instrument(skip(store, principal, dto), fields(role = %principal.role))]
    pub async fn create_column(
        store: &dyn CategoryStore,
        principal: &Principal,
        category_id: CategoryId,
        dto: CreateColumnDto,
    ) -> Result<Column, AppError> {
        Self::require_manage(principal)?;

        store
            .category(category_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Category not found")))?;

        if let (Some(min), Some(max)) = (dto.min_value, dto.max_value) {
            if min > max {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "min_value cannot exceed max_value"
                )));
            }
        }

        let now = Utc::now();
        let column = store
            .insert_column(Column {
                id: ColumnId::new(),
                category_id,
                name: dto.name,
                column_type: dto.column_type,
                required: dto.required,
                max_length: dto.max_length,
                min_value: dto.min_value,
                max_value: dto.max_value,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(column_id = %column.id, category_id = %category_id, "Column created");
        Ok(column)
    }

    fn require_manage(principal: &Principal) -> Result<(), AppError> {
        if PermissionService::can_manage_categories(&principal.role) {
            Ok(())
        } else {
            Err(AppError::forbidden(anyhow::anyhow!(
                "Only superadmin and regionadmin can manage categories"
            )))
        }
    }
}
