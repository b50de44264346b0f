use crate::modules::hierarchy::controller::{
    get_region, get_regions, get_school, get_schools, get_sector, get_sectors,
};
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_regions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_regions))
        .route("/{id}", get(get_region))
}

pub fn init_sectors_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_sectors))
        .route("/{id}", get(get_sector))
}

pub fn init_schools_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_schools))
        .route("/{id}", get(get_school))
}
