use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use showroom_database::Database;
use showroom_domain::config::{ApiConfig, UploadConfig};
use showroom_kernel::server::ApiState;
use showroom_storage::Storage;
use tower::ServiceExt;

const BOUNDARY: &str = "showroom-test-boundary";

struct App {
    router: Router,
    _tmp: tempfile::TempDir,
}

impl App {
    async fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let db = Database::builder().url("mem://").session("showroom", "http").init().await.unwrap();
        let storage = Storage::builder().root(tmp.path().join("uploads")).connect().await.unwrap();
        let upload = UploadConfig { max_bytes: 64, ..UploadConfig::default() };

        let slice = showroom_catalog::init(db.clone(), &storage, upload.clone()).unwrap();
        let state = ApiState::builder()
            .config(ApiConfig::default())
            .db(db)
            .storage(storage)
            .register_slice(slice)
            .build()
            .unwrap();

        Self { router: showroom_catalog::router(&upload).with_state(state), _tmp: tmp }
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, body: &'static str) -> Response<Body> {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn post_logo(&self, uri: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Response<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"logo\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Creates "Acme" and returns its canonical URL.
    async fn create_acme(&self) -> String {
        let response = self.post_form("/catalog/brand/create", "name=Acme&founded=1975-04-01").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        location(&response)
    }
}

fn location(response: &Response<Body>) -> String {
    response.headers()[header::LOCATION].to_str().unwrap().to_owned()
}

async fn text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn home_shows_counts() {
    let app = App::new().await;
    app.create_acme().await;

    let response = app.get("/catalog").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("<strong>Brands:</strong> 1"));
}

#[tokio::test]
async fn created_brand_is_listed_and_has_a_detail_page() {
    let app = App::new().await;
    let url = app.create_acme().await;
    assert!(url.starts_with("/catalog/brand/"));

    let list = text(app.get("/catalog/brands").await).await;
    assert!(list.contains(&format!(r#"<a href="{url}">Acme</a>"#)));

    let response = app.get(&url).await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = text(response).await;
    assert!(detail.contains("1975"));
    assert!(detail.contains("This brand has no models."));
}

#[tokio::test]
async fn creating_an_existing_name_redirects_to_it() {
    let app = App::new().await;
    let url = app.create_acme().await;

    let again = app.post_form("/catalog/brand/create", "name=Acme").await;
    assert_eq!(again.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&again), url);
}

#[tokio::test]
async fn invalid_form_is_redisplayed() {
    let app = App::new().await;

    let response = app.post_form("/catalog/brand/create", "name=Ac%21me&founded=soon").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = text(response).await;
    assert!(html.contains("Brand name has non-alphanumeric characters."));
    assert!(html.contains("Invalid date"));
    assert!(html.contains(r#"value="Ac!me""#));
}

#[tokio::test]
async fn unknown_brand_detail_is_404_but_mutations_redirect() {
    let app = App::new().await;

    let response = app.get("/catalog/brand/missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(text(response).await.contains("The requested brand does not exist."));

    for uri in ["/catalog/brand/missing/update", "/catalog/brand/missing/logo"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/catalog/brands");
    }

    let response = app.post_form("/catalog/brand/missing/update", "name=Acme").await;
    assert_eq!(location(&response), "/catalog/brands");
}

#[tokio::test]
async fn update_redirects_to_the_brand() {
    let app = App::new().await;
    let url = app.create_acme().await;

    let form = text(app.get(&format!("{url}/update")).await).await;
    assert!(form.contains(r#"value="1975-04-01""#));

    let response = app.post_form(&format!("{url}/update"), "name=Acme2&founded=").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), url);
    assert!(text(app.get(&url).await).await.contains("Brand: Acme2"));
}

#[tokio::test]
async fn logo_upload_accepts_images_and_rejects_the_rest() {
    let app = App::new().await;
    let url = app.create_acme().await;
    let logo = format!("{url}/logo");

    let rejected = app.post_logo(&logo, "notes.txt", "text/plain", b"hello").await;
    assert_eq!(rejected.status(), StatusCode::OK);
    assert!(text(rejected).await.contains("Only image files are allowed!"));

    let too_large = app.post_logo(&logo, "big.png", "image/png", &[0_u8; 65]).await;
    assert!(text(too_large).await.contains("File is too large"));

    let empty = app.post_logo(&logo, "empty.png", "image/png", b"").await;
    assert!(text(empty).await.contains("No file was uploaded."));

    let stored = app.post_logo(&logo, "Acme.PNG", "image/png", b"\x89PNG\r\n\x1a\n").await;
    assert_eq!(stored.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&stored), url);
    assert!(text(app.get(&url).await).await.contains(r#"src="/uploads/brand/logo-"#));
}

#[tokio::test]
async fn delete_removes_the_brand() {
    let app = App::new().await;
    let url = app.create_acme().await;

    let confirm = text(app.get(&format!("{url}/delete")).await).await;
    assert!(confirm.contains("Do you really want to delete this brand?"));

    let response = app.post_form(&format!("{url}/delete"), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/brands");
    assert_eq!(app.get(&url).await.status(), StatusCode::NOT_FOUND);
}
