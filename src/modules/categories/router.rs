use crate::modules::categories::controller::{
    create_category, create_column, get_categories, get_category, get_columns, update_category,
};
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_categories_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_categories).post(create_category))
        .route("/{id}", get(get_category).put(update_category))
        .route("/{id}/columns", get(get_columns).post(create_column))
}
