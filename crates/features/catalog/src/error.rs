use std::borrow::Cow;

#[showroom_derive::showroom_error]
pub enum CatalogError {
    /// The id is malformed or names no stored brand.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("Store error{}: {source}", format_context(.context))]
    Store { source: surrealdb::Error, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("Storage error{}: {source}", format_context(.context))]
    Storage { source: showroom_storage::StorageError, context: Option<Cow<'static, str>> },

    #[error("Template error{}: {source}", format_context(.context))]
    Template { source: handlebars::TemplateError, context: Option<Cow<'static, str>> },

    #[error("Render error{}: {source}", format_context(.context))]
    Render { source: handlebars::RenderError, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("Slice error{}: {source}", format_context(.context))]
    Slice {
        source: showroom_kernel::server::ApiStateError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal catalog error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl CatalogError {
    pub(crate) fn not_found(what: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: what.into(), context: None }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(feature = "server")]
impl axum::response::IntoResponse for CatalogError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status =
            if self.is_not_found() { StatusCode::NOT_FOUND } else { StatusCode::INTERNAL_SERVER_ERROR };
        if status.is_server_error() {
            tracing::error!(error = %self, "Catalog request failed");
        }
        let reason = status.canonical_reason().unwrap_or("Error");
        (status, reason).into_response()
    }
}
