use axum::Router;
use axum::response::Redirect;
use axum::routing::get;
use showroom_domain::constants::{CATALOG_PATH, UPLOADS_PATH};
use showroom_kernel::server::{ApiState, system_router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Assembles every route: the catalog pages, uploaded files, health and the root redirect.
pub fn init(state: ApiState) -> Router {
    let uploads = ServeDir::new(state.storage.root());

    Router::new()
        .route("/", get(|| async { Redirect::to(CATALOG_PATH) }))
        .merge(system_router())
        .merge(showroom_catalog::router(&state.config.upload))
        .nest_service(UPLOADS_PATH, uploads)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
