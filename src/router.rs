use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::modules::access::router::init_access_router;
use crate::modules::approvals::router::init_approvals_router;
use crate::modules::categories::router::init_categories_router;
use crate::modules::hierarchy::router::{
    init_regions_router, init_schools_router, init_sectors_router,
};
use crate::modules::session::router::init_session_router;
use crate::modules::submissions::router::init_submissions_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/session", init_session_router())
                .nest("/access", init_access_router())
                .nest("/regions", init_regions_router())
                .nest("/sectors", init_sectors_router())
                .nest("/schools", init_schools_router())
                .nest("/categories", init_categories_router())
                .nest("/submissions", init_submissions_router())
                .nest("/approvals", init_approvals_router()),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
