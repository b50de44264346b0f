use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::access::model::{AccessLevel, CheckAccessRequest, Decision, EntityKind};
use crate::modules::approvals::model::{
    BulkAction, BulkItemResult, BulkOutcome, BulkRequest, BulkResponse,
};
use crate::modules::session::controller::{ErrorResponse, SignOutResponse};
use formline_core::{PaginationMeta, PaginationParams};
use formline_models::categories::{
    Category, CategoryAssignment, Column, ColumnType, CreateCategoryDto, CreateColumnDto,
    PaginatedCategoriesResponse, UpdateCategoryDto,
};
use formline_models::hierarchy::{EntityStatus, Region, School, Sector};
use formline_models::roles::PrincipalView;
use formline_models::submissions::{
    QueueItem, RejectDto, SubmissionKey, SubmissionStatus, SubmissionView, WriteValueDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::session::controller::me,
        crate::modules::session::controller::refresh,
        crate::modules::session::controller::sign_out,
        crate::modules::access::controller::check_access,
        crate::modules::hierarchy::controller::get_regions,
        crate::modules::hierarchy::controller::get_region,
        crate::modules::hierarchy::controller::get_sectors,
        crate::modules::hierarchy::controller::get_sector,
        crate::modules::hierarchy::controller::get_schools,
        crate::modules::hierarchy::controller::get_school,
        crate::modules::categories::controller::get_categories,
        crate::modules::categories::controller::get_category,
        crate::modules::categories::controller::get_columns,
        crate::modules::categories::controller::create_category,
        crate::modules::categories::controller::update_category,
        crate::modules::categories::controller::create_column,
        crate::modules::submissions::controller::get_submission,
        crate::modules::submissions::controller::write_value,
        crate::modules::submissions::controller::submit,
        crate::modules::submissions::controller::approve,
        crate::modules::submissions::controller::reject,
        crate::modules::submissions::controller::reset,
        crate::modules::approvals::controller::get_queue,
        crate::modules::approvals::controller::bulk_decide,
    ),
    components(
        schemas(
            PrincipalView,
            ErrorResponse,
            SignOutResponse,
            AccessLevel,
            EntityKind,
            CheckAccessRequest,
            Decision,
            EntityStatus,
            Region,
            Sector,
            School,
            Category,
            CategoryAssignment,
            Column,
            ColumnType,
            CreateCategoryDto,
            UpdateCategoryDto,
            CreateColumnDto,
            PaginatedCategoriesResponse,
            PaginationMeta,
            PaginationParams,
            SubmissionStatus,
            SubmissionKey,
            SubmissionView,
            WriteValueDto,
            RejectDto,
            QueueItem,
            BulkAction,
            BulkRequest,
            BulkOutcome,
            BulkItemResult,
            BulkResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Session", description = "Session cache endpoints"),
        (name = "Access", description = "Permission evaluation"),
        (name = "Hierarchy", description = "Region, sector and school lookups"),
        (name = "Categories", description = "Data-collection categories and columns"),
        (name = "Submissions", description = "Submission lifecycle"),
        (name = "Approvals", description = "Approval queue and bulk decisions")
    ),
    info(
        title = "Formline API",
        version = "0.1.0",
        description = "A REST API for hierarchical school data collection with scoped approval workflows, built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
