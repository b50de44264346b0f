use crate::modules::approvals::controller::{bulk_decide, get_queue};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_approvals_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_queue))
        .route("/bulk", post(bulk_decide))
}
