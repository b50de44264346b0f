use crate::modules::access::controller::check_access;
use crate::state::AppState;
use axum::{Router, routing::post};

pub fn init_access_router() -> Router<AppState> {
    Router::new().route("/check", post(check_access))
}
