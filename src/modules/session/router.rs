use crate::modules::session::controller::{me, refresh, sign_out};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_session_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/refresh", post(refresh))
        .route("/sign-out", post(sign_out))
}
