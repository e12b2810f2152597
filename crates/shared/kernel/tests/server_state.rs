#![cfg(feature = "server")]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use showroom_database::Database;
use showroom_domain::config::ApiConfig;
use showroom_domain::registry::{FeatureSlice, InitializedSlice};
use showroom_kernel::server::{ApiState, ApiStateError, system_router};
use showroom_storage::Storage;
use std::any::Any;
use tower::ServiceExt;

#[derive(Debug)]
struct Catalogue(&'static str);

impl FeatureSlice for Catalogue {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

async fn infrastructure() -> (Database, Storage, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let db = Database::builder().url("mem://").session("kernel", "state").init().await.unwrap();
    let storage = Storage::builder().root(tmp.path()).connect().await.unwrap();
    (db, storage, tmp)
}

#[tokio::test]
async fn registered_slices_are_found_by_type() {
    let (db, storage, _tmp) = infrastructure().await;
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .db(db)
        .storage(storage)
        .register_slice(InitializedSlice::new(Catalogue("brands")))
        .build()
        .unwrap();

    assert_eq!(state.try_get_slice::<Catalogue>().unwrap().0, "brands");
    assert_eq!(state.slice_ids().count(), 1);
}

#[tokio::test]
async fn missing_slice_and_missing_parts_are_errors() {
    let (db, storage, _tmp) = infrastructure().await;
    let state =
        ApiState::builder().config(ApiConfig::default()).db(db).storage(storage).build().unwrap();
    assert!(matches!(state.try_get_slice::<Catalogue>(), Err(ApiStateError::MissingSlice { .. })));

    let err = ApiState::builder().config(ApiConfig::default()).build().unwrap_err();
    assert!(matches!(err, ApiStateError::Validation { .. }));
}

#[tokio::test]
async fn health_reports_up_without_caching() {
    let response = system_router::<()>()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store, no-cache, must-revalidate");

    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "up");
    assert!(json["uptime"].is_u64());
}
