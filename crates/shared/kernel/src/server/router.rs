use super::health::{self, START_TIME};
use axum::Router;
use axum::routing::get;
use showroom_domain::constants::HEALTH_PATH;
use std::sync::LazyLock;

/// Routes every deployment exposes regardless of the registered slices.
pub fn system_router<S>() -> Router<S>
where
    S: Send + Sync + Clone + 'static,
{
    LazyLock::force(&START_TIME);
    Router::<S>::new().route(HEALTH_PATH, get(health::health_handler))
}
