use std::sync::Arc;

use axum::{Router, middleware};

use crate::{
    middleware::{catch_panic_layer, json_error_middleware},
    state::AppState,
};

use super::{public, todos};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public::router())
        .merge(todos::router(state))
}

/// The router plus the layers that keep every response inside the JSON
/// envelope. Request tracing is added by the binary.
pub fn app(state: Arc<AppState>) -> Router {
    router(state)
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
}
