use super::handlers;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use showroom_domain::config::UploadConfig;
use showroom_kernel::server::ApiState;

/// Slack on top of the file limit for multipart framing and other fields.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Brand pages under `/catalog`.
///
/// The logo route accepts bodies slightly larger than `upload.max_bytes` so oversized
/// files reach the handler and get the inline "too large" message.
pub fn router(upload: &UploadConfig) -> Router<ApiState> {
    let logo_limit = upload.max_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/catalog", get(handlers::home))
        .route("/catalog/brands", get(handlers::list))
        .route("/catalog/brand/create", get(handlers::create_form).post(handlers::create))
        .route("/catalog/brand/{id}", get(handlers::detail))
        .route("/catalog/brand/{id}/update", get(handlers::update_form).post(handlers::update))
        .route("/catalog/brand/{id}/delete", get(handlers::delete_form).post(handlers::delete))
        .route(
            "/catalog/brand/{id}/logo",
            get(handlers::upload_form)
                .post(handlers::upload)
                .layer(DefaultBodyLimit::max(logo_limit)),
        )
}
