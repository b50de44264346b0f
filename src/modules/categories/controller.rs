use crate::middleware::auth::AuthUser;
use crate::modules::categories::service::CategoryService;
use crate::modules::session::controller::ErrorResponse;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use formline_core::AppError;
use formline_models::categories::{
    Category, CategoryFilterParams, Column, CreateCategoryDto, CreateColumnDto,
    PaginatedCategoriesResponse, UpdateCategoryDto,
};
use formline_models::ids::CategoryId;
use tracing::instrument;
use validator::Validate;

/// List categories visible to the authenticated principal
#[utoipa::path(
    get,
    path = "/api/categories",
    params(CategoryFilterParams),
    responses(
        (status = 200, description = "Paginated category list", body = PaginatedCategoriesResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state))]
pub async fn get_categories(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(params): Query<CategoryFilterParams>,
) -> Result<Json<PaginatedCategoriesResponse>, AppError> {
    let page = CategoryService::list_categories(state.categories.as_ref(), &principal, params)
        .await?;
    Ok(Json(page))
}

/// Get a single category
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = CategoryId, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 403, description = "Category not visible to role", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>, AppError> {
    let category = CategoryService::get_category(state.categories.as_ref(), &principal, id).await?;
    Ok(Json(category))
}

/// List a category's columns
#[utoipa::path(
    get,
    path = "/api/categories/{id}/columns",
    params(("id" = CategoryId, Path, description = "Category id")),
    responses(
        (status = 200, description = "Columns", body = Vec<Column>),
        (status = 403, description = "Category not visible to role", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state))]
pub async fn get_columns(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<Column>>, AppError> {
    let columns = CategoryService::get_columns(state.categories.as_ref(), &principal, id).await?;
    Ok(Json(columns))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 200, description = "Category created", body = Category),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Role cannot manage categories", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state, dto))]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(dto): Json<CreateCategoryDto>,
) -> Result<Json<Category>, AppError> {
    dto.validate().map_err(AppError::bad_request)?;
    let category =
        CategoryService::create_category(state.categories.as_ref(), &principal, dto).await?;
    Ok(Json(category))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = CategoryId, Path, description = "Category id")),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 403, description = "Role cannot manage categories", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state, dto))]
pub async fn update_category(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<CategoryId>,
    Json(dto): Json<UpdateCategoryDto>,
) -> Result<Json<Category>, AppError> {
    dto.validate().map_err(AppError::bad_request)?;
    let category =
        CategoryService::update_category(state.categories.as_ref(), &principal, id, dto).await?;
    Ok(Json(category))
}

/// Add a column to a category
#[utoipa::path(
    post,
    path = "/api/categories/{id}/columns",
    params(("id" = CategoryId, Path, description = "Category id")),
    request_body = CreateColumnDto,
    responses(
        (status = 200, description = "Column created", body = Column),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Role cannot manage categories", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state, dto))]
pub async fn create_column(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<CategoryId>,
    Json(dto): Json<CreateColumnDto>,
) -> Result<Json<Column>, AppError> {
    dto.validate().map_err(AppError::bad_request)?;
    let column =
        CategoryService::create_column(state.categories.as_ref(), &principal, id, dto).await?;
    Ok(Json(column))
}
