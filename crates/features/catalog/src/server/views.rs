use super::workflow::{BrandPage, Counts};
use crate::domain::{Brand, FormValues, Model, ValidationFailure};
use crate::error::{CatalogError, CatalogErrorExt};
use handlebars::Handlebars;
use serde::Serialize;

const LAYOUT: &str = include_str!("../../templates/layout.hbs");

/// Pages known to [`Views`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    BrandList,
    BrandDetail,
    BrandForm,
    BrandDelete,
    BrandLogoForm,
    Error,
}

impl View {
    pub const ALL: [Self; 7] = [
        Self::Home,
        Self::BrandList,
        Self::BrandDetail,
        Self::BrandForm,
        Self::BrandDelete,
        Self::BrandLogoForm,
        Self::Error,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::BrandList => "brand_list",
            Self::BrandDetail => "brand_detail",
            Self::BrandForm => "brand_form",
            Self::BrandDelete => "brand_delete",
            Self::BrandLogoForm => "brand_logo_form",
            Self::Error => "error",
        }
    }

    const fn source(self) -> &'static str {
        match self {
            Self::Home => include_str!("../../templates/home.hbs"),
            Self::BrandList => include_str!("../../templates/brand_list.hbs"),
            Self::BrandDetail => include_str!("../../templates/brand_detail.hbs"),
            Self::BrandForm => include_str!("../../templates/brand_form.hbs"),
            Self::BrandDelete => include_str!("../../templates/brand_delete.hbs"),
            Self::BrandLogoForm => include_str!("../../templates/brand_logo_form.hbs"),
            Self::Error => include_str!("../../templates/error.hbs"),
        }
    }
}

/// Template-facing projection of a [`Brand`] with its derived attributes.
#[derive(Debug, Serialize)]
struct BrandView<'a> {
    id: &'a str,
    name: &'a str,
    url: String,
    founded: String,
    founded_yyyy_mm_dd: String,
    logo_url: Option<String>,
}

impl<'a> From<&'a Brand> for BrandView<'a> {
    fn from(brand: &'a Brand) -> Self {
        Self {
            id: brand.id.as_str(),
            name: &brand.name,
            url: brand.url(),
            founded: brand.founded_formatted(),
            founded_yyyy_mm_dd: brand.founded_yyyy_mm_dd(),
            logo_url: brand.logo_url(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ModelView<'a> {
    name: &'a str,
    url: String,
}

impl<'a> From<&'a Model> for ModelView<'a> {
    fn from(model: &'a Model) -> Self {
        Self { name: &model.name, url: model.url() }
    }
}

fn models(models: &[Model]) -> Vec<ModelView<'_>> {
    models.iter().map(ModelView::from).collect()
}

#[derive(Debug, Serialize)]
struct HomeData {
    title: &'static str,
    brands: u64,
    models: u64,
    features: u64,
}

#[derive(Debug, Serialize)]
struct ListData<'a> {
    title: &'static str,
    brands: Vec<BrandView<'a>>,
}

#[derive(Debug, Serialize)]
struct PageData<'a> {
    title: String,
    brand: BrandView<'a>,
    models: Vec<ModelView<'a>>,
}

#[derive(Debug, Default, Serialize)]
struct FieldMessages<'a> {
    name: Option<&'a str>,
    founded: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct FormData<'a> {
    title: &'a str,
    action: &'a str,
    values: &'a FormValues,
    errors: FieldMessages<'a>,
}

#[derive(Debug, Serialize)]
struct LogoFormData<'a> {
    title: String,
    brand: BrandView<'a>,
    error: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ErrorData<'a> {
    title: &'a str,
    message: &'a str,
}

/// Where a brand form posts to, and its heading.
#[derive(Debug, Clone, Copy)]
pub struct FormTarget<'a> {
    pub title: &'a str,
    pub action: &'a str,
}

/// Compiled templates. Built once at startup and shared read-only.
#[derive(Debug)]
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    /// # Errors
    /// [`CatalogError::Template`] when an embedded template fails to parse.
    pub fn new() -> Result<Self, CatalogError> {
        let mut registry = Handlebars::new();
        registry.set_dev_mode(false);
        registry.register_partial("layout", LAYOUT).context("layout")?;
        for view in View::ALL {
            registry.register_template_string(view.name(), view.source()).context(view.name())?;
        }
        Ok(Self { registry })
    }

    /// Renders `view` with arbitrary serializable data.
    ///
    /// # Errors
    /// [`CatalogError::Render`] when the data does not fit the template.
    pub fn render<T: Serialize>(&self, view: View, data: &T) -> Result<String, CatalogError> {
        self.registry.render(view.name(), data).context(view.name())
    }

    /// # Errors
    /// See [`Self::render`].
    pub fn home(&self, counts: &Counts) -> Result<String, CatalogError> {
        let data = HomeData {
            title: "Showroom catalog",
            brands: counts.brands,
            models: counts.models,
            features: counts.features,
        };
        self.render(View::Home, &data)
    }

    /// # Errors
    /// See [`Self::render`].
    pub fn brand_list(&self, brands: &[Brand]) -> Result<String, CatalogError> {
        let data =
            ListData { title: "Brand list", brands: brands.iter().map(BrandView::from).collect() };
        self.render(View::BrandList, &data)
    }

    /// # Errors
    /// See [`Self::render`].
    pub fn brand_detail(&self, page: &BrandPage) -> Result<String, CatalogError> {
        let data = PageData {
            title: format!("Brand: {}", page.brand.name),
            brand: BrandView::from(&page.brand),
            models: models(&page.models),
        };
        self.render(View::BrandDetail, &data)
    }

    /// Form with `values` prefilled and the first message of each failing field.
    ///
    /// # Errors
    /// See [`Self::render`].
    pub fn brand_form(
        &self,
        target: FormTarget<'_>,
        values: &FormValues,
        failure: Option<&ValidationFailure>,
    ) -> Result<String, CatalogError> {
        let errors = failure.map_or_else(FieldMessages::default, |failure| FieldMessages {
            name: failure.message_for("name"),
            founded: failure.message_for("founded"),
        });
        let data = FormData { title: target.title, action: target.action, values, errors };
        self.render(View::BrandForm, &data)
    }

    /// Confirmation page. Lists the blocking models when there are any.
    ///
    /// # Errors
    /// See [`Self::render`].
    pub fn brand_delete(&self, brand: &Brand, blocking: &[Model]) -> Result<String, CatalogError> {
        let data = PageData {
            title: format!("Delete brand: {}", brand.name),
            brand: BrandView::from(brand),
            models: models(blocking),
        };
        self.render(View::BrandDelete, &data)
    }

    /// # Errors
    /// See [`Self::render`].
    pub fn brand_logo_form(
        &self,
        brand: &Brand,
        error: Option<&str>,
    ) -> Result<String, CatalogError> {
        let data = LogoFormData {
            title: format!("Upload logo: {}", brand.name),
            brand: BrandView::from(brand),
            error,
        };
        self.render(View::BrandLogoForm, &data)
    }

    /// # Errors
    /// See [`Self::render`].
    pub fn error(&self, reason: &str, message: &str) -> Result<String, CatalogError> {
        self.render(View::Error, &ErrorData { title: reason, message })
    }
}

/// Used when even the error template cannot be rendered.
pub(crate) fn fallback_page(reason: &str) -> String {
    format!("<!DOCTYPE html><html><body><h1>{reason}</h1></body></html>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BrandForm, BrandId};
    use chrono::NaiveDate;

    fn brand(logo: Option<&str>) -> Brand {
        Brand {
            id: BrandId::parse("abc123").unwrap(),
            name: "Acme".to_owned(),
            founded: NaiveDate::from_ymd_opt(1975, 4, 1),
            logo: logo.map(str::to_owned),
        }
    }

    #[test]
    fn every_template_compiles() {
        assert!(Views::new().is_ok());
    }

    #[test]
    fn list_links_to_canonical_urls_and_skips_missing_logos() {
        let views = Views::new().unwrap();
        let html = views.brand_list(&[brand(None)]).unwrap();
        assert!(html.contains(r#"href="/catalog/brand/abc123""#));
        assert!(html.contains("(1975)"));
        assert!(!html.contains("<img"));

        let html = views.brand_list(&[]).unwrap();
        assert!(html.contains("There are no brands."));
    }

    #[test]
    fn detail_shows_logo_and_models() {
        let views = Views::new().unwrap();
        let page = BrandPage {
            brand: brand(Some("logo-1.png")),
            models: vec![Model {
                id: "m1".to_owned(),
                name: "Roadster".to_owned(),
                brand: BrandId::parse("abc123").unwrap(),
            }],
        };
        let html = views.brand_detail(&page).unwrap();
        assert!(html.contains(r#"src="/uploads/brand/logo-1.png""#));
        assert!(html.contains(r#"href="/catalog/model/m1""#));
        assert!(html.contains("<title>Brand: Acme | Showroom</title>"));
    }

    #[test]
    fn rejected_form_redisplays_escaped_values_once() {
        let views = Views::new().unwrap();
        let form =
            BrandForm { name: Some("<script>".to_owned()), founded: Some("nope".to_owned()) };
        let failure = form.validate().unwrap_err();

        let target = FormTarget { title: "Create brand", action: "/catalog/brand/create" };
        let html = views.brand_form(target, &failure.values, Some(&failure)).unwrap();

        assert!(html.contains(r#"value="&lt;script&gt;""#));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Brand name has non-alphanumeric characters."));
        assert!(html.contains("Invalid date"));
    }

    #[test]
    fn delete_page_lists_blocking_models() {
        let views = Views::new().unwrap();
        let html = views.brand_delete(&brand(None), &[]).unwrap();
        assert!(html.contains("Do you really want to delete this brand?"));

        let blocking = [Model {
            id: "m1".to_owned(),
            name: "Roadster".to_owned(),
            brand: BrandId::parse("abc123").unwrap(),
        }];
        let html = views.brand_delete(&brand(None), &blocking).unwrap();
        assert!(html.contains("Delete the following models"));
        assert!(!html.contains("<form"));
    }
}
