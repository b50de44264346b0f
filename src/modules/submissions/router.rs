use crate::modules::submissions::controller::{
    approve, get_submission, reject, reset, submit, write_value,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn init_submissions_router() -> Router<AppState> {
    Router::new()
        .route("/{school_id}/{category_id}", get(get_submission))
        .route("/{school_id}/{category_id}/values", put(write_value))
        .route("/{school_id}/{category_id}/submit", post(submit))
        .route("/{school_id}/{category_id}/approve", post(approve))
        .route("/{school_id}/{category_id}/reject", post(reject))
        .route("/{school_id}/{category_id}/reset", post(reset))
}
