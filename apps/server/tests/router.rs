use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use showroom_domain::config::ApiConfig;
use showroom_server::Server;
use tower::ServiceExt;

async fn app() -> (axum::Router, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = ApiConfig::default();
    cfg.storage.upload_dir = tmp.path().join("uploads");

    let server = Server::builder().config(cfg).build().await.unwrap();
    (showroom_server::build_router(server.state().clone()), tmp)
}

#[tokio::test]
async fn root_redirects_to_catalog() {
    let (app, _tmp) = app().await;

    let response = app.oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/catalog");
}

#[tokio::test]
async fn health_and_catalog_are_mounted() {
    let (app, _tmp) = app().await;

    let health =
        app.clone().oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let home = app.oneshot(Request::get("/catalog").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(home.status(), StatusCode::OK);
    let html = to_bytes(home.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&html).contains("<strong>Brands:</strong> 0"));
}

#[tokio::test]
async fn uploaded_files_are_served() {
    let (app, tmp) = app().await;
    std::fs::create_dir_all(tmp.path().join("uploads/brand")).unwrap();
    std::fs::write(tmp.path().join("uploads/brand/logo-1.png"), b"\x89PNG").unwrap();

    let response = app
        .clone()
        .oneshot(Request::get("/uploads/brand/logo-1.png").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(to_bytes(response.into_body(), usize::MAX).await.unwrap().as_ref(), b"\x89PNG");

    let missing = app
        .oneshot(Request::get("/uploads/brand/nope.png").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
