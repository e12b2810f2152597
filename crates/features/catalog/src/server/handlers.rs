use super::Catalog;
use super::upload::{UploadError, read_logo};
use super::views::{FormTarget, fallback_page};
use super::workflow::{Deletion, LogoUpload, Submission};
use crate::domain::{Brand, BrandForm, FormValues, ValidationFailure};
use crate::error::{CatalogError, CatalogErrorExt};
use axum::Form;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{FromRequestParts, Multipart, Path};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Redirect, Response};
use showroom_kernel::server::ApiState;
use tracing::{error, instrument};

const BRAND_LIST: &str = "/catalog/brands";

/// The catalog slice pulled out of [`ApiState`].
#[derive(Debug, Clone)]
pub struct CatalogHandle(pub Catalog);

impl FromRequestParts<ApiState> for CatalogHandle {
    type Rejection = CatalogError;

    async fn from_request_parts(_parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        state.try_get_slice::<Catalog>().cloned().map(Self).context("Catalog slice")
    }
}

fn rendered(catalog: &Catalog, page: Result<String, CatalogError>) -> Response {
    match page {
        Ok(body) => Html(body).into_response(),
        Err(err) => failure(catalog, err),
    }
}

/// Error page for read-only routes: 404 for unknown brands, 500 otherwise.
fn failure(catalog: &Catalog, err: CatalogError) -> Response {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "The requested brand does not exist.")
    } else {
        error!(error = %err, "Catalog request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong, please try again later.")
    };
    let reason = status.canonical_reason().unwrap_or("Error");

    let body = catalog
        .views
        .error(reason, message)
        .unwrap_or_else(|_| fallback_page(reason));
    (status, Html(body)).into_response()
}

/// Mutation routes send stale links back to the list instead of a 404.
fn failure_or_list(catalog: &Catalog, err: CatalogError) -> Response {
    if err.is_not_found() {
        Redirect::to(BRAND_LIST).into_response()
    } else {
        failure(catalog, err)
    }
}

fn form_page(
    catalog: &Catalog,
    target: FormTarget<'_>,
    values: &FormValues,
    submission: Option<&ValidationFailure>,
) -> Response {
    rendered(catalog, catalog.views.brand_form(target, values, submission))
}

fn update_action(brand: &Brand) -> String {
    format!("{}/update", brand.url())
}

const CREATE_TARGET: FormTarget<'static> =
    FormTarget { title: "Create brand", action: "/catalog/brand/create" };

#[instrument(skip_all)]
pub(crate) async fn home(CatalogHandle(catalog): CatalogHandle) -> Response {
    let page = match catalog.workflow.home().await {
        Ok(counts) => catalog.views.home(&counts),
        Err(err) => Err(err),
    };
    rendered(&catalog, page)
}

#[instrument(skip_all)]
pub(crate) async fn list(CatalogHandle(catalog): CatalogHandle) -> Response {
    let page = match catalog.workflow.list().await {
        Ok(brands) => catalog.views.brand_list(&brands),
        Err(err) => Err(err),
    };
    rendered(&catalog, page)
}

#[instrument(skip(catalog))]
pub(crate) async fn detail(
    CatalogHandle(catalog): CatalogHandle,
    Path(id): Path<String>,
) -> Response {
    let page = match catalog.workflow.detail(&id).await {
        Ok(page) => catalog.views.brand_detail(&page),
        Err(err) => Err(err),
    };
    rendered(&catalog, page)
}

#[instrument(skip_all)]
pub(crate) async fn create_form(CatalogHandle(catalog): CatalogHandle) -> Response {
    let values = catalog.workflow.create_form();
    form_page(&catalog, CREATE_TARGET, &values, None)
}

#[instrument(skip_all)]
pub(crate) async fn create(
    CatalogHandle(catalog): CatalogHandle,
    Form(form): Form<BrandForm>,
) -> Response {
    match catalog.workflow.create(&form).await {
        Ok(Submission::Saved(brand) | Submission::Existing(brand)) => {
            Redirect::to(&brand.url()).into_response()
        }
        Ok(Submission::Rejected(failure)) => {
            form_page(&catalog, CREATE_TARGET, &failure.values, Some(&failure))
        }
        Err(err) => failure(&catalog, err),
    }
}

#[instrument(skip(catalog))]
pub(crate) async fn update_form(
    CatalogHandle(catalog): CatalogHandle,
    Path(id): Path<String>,
) -> Response {
    match catalog.workflow.update_form(&id).await {
        Ok(brand) => {
            let action = update_action(&brand);
            let title = format!("Update brand: {}", brand.name);
            let target = FormTarget { title: &title, action: &action };
            form_page(&catalog, target, &FormValues::from(&brand), None)
        }
        Err(err) => failure_or_list(&catalog, err),
    }
}

#[instrument(skip(catalog, form))]
pub(crate) async fn update(
    CatalogHandle(catalog): CatalogHandle,
    Path(id): Path<String>,
    Form(form): Form<BrandForm>,
) -> Response {
    match catalog.workflow.update(&id, &form).await {
        Ok(Submission::Saved(brand) | Submission::Existing(brand)) => {
            Redirect::to(&brand.url()).into_response()
        }
        Ok(Submission::Rejected(failure)) => {
            let action = format!("/catalog/brand/{id}/update");
            let target = FormTarget { title: "Update brand", action: &action };
            form_page(&catalog, target, &failure.values, Some(&failure))
        }
        Err(err) => failure_or_list(&catalog, err),
    }
}

#[instrument(skip(catalog))]
pub(crate) async fn delete_form(
    CatalogHandle(catalog): CatalogHandle,
    Path(id): Path<String>,
) -> Response {
    match catalog.workflow.delete_form(&id).await {
        Ok(page) => rendered(&catalog, catalog.views.brand_delete(&page.brand, &page.models)),
        Err(err) => failure_or_list(&catalog, err),
    }
}

#[instrument(skip(catalog))]
pub(crate) async fn delete(
    CatalogHandle(catalog): CatalogHandle,
    Path(id): Path<String>,
) -> Response {
    match catalog.workflow.delete(&id).await {
        Ok(Deletion::Removed) => Redirect::to(BRAND_LIST).into_response(),
        Ok(Deletion::Blocked { brand, models }) => {
            rendered(&catalog, catalog.views.brand_delete(&brand, &models))
        }
        Err(err) => failure_or_list(&catalog, err),
    }
}

#[instrument(skip(catalog))]
pub(crate) async fn upload_form(
    CatalogHandle(catalog): CatalogHandle,
    Path(id): Path<String>,
) -> Response {
    match catalog.workflow.upload_form(&id).await {
        Ok(brand) => rendered(&catalog, catalog.views.brand_logo_form(&brand, None)),
        Err(err) => failure_or_list(&catalog, err),
    }
}

#[instrument(skip(catalog, multipart))]
pub(crate) async fn upload(
    CatalogHandle(catalog): CatalogHandle,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let max_bytes = catalog.workflow.uploader().rules().max_bytes;
    let file = match multipart {
        Ok(mut multipart) => read_logo(&mut multipart, max_bytes).await,
        Err(rejection) => Err(UploadError::Missing { context: Some(rejection.body_text().into()) }),
    };

    match catalog.workflow.upload_logo(&id, file).await {
        Ok(LogoUpload::Stored(brand)) => Redirect::to(&brand.url()).into_response(),
        Ok(LogoUpload::Rejected { brand, message }) => {
            rendered(&catalog, catalog.views.brand_logo_form(&brand, Some(&message)))
        }
        Err(err) => failure_or_list(&catalog, err),
    }
}
