use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::main_lib::AppState;

mod health;
mod jobs;

/// Upper bound for a single API request; enqueueing is one Redis round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(jobs::router())
        .merge(health::router())
        .with_state(state)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
}
