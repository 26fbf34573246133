//! The page to display when something goes wrong on the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{endpoints, html::error_view};

/// The description and suggested fix shown on the error page.
pub struct InternalServerErrorPageTemplate {
    /// A short description of what went wrong.
    pub description: String,
    /// What the user (or operator) can do about it.
    pub fix: String,
}

impl Default for InternalServerErrorPageTemplate {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.".to_owned(),
            fix: "Try again later or check the server logs.".to_owned(),
        }
    }
}

/// Render the error page with the given status code.
pub fn render_internal_server_error(
    status_code: StatusCode,
    template: InternalServerErrorPageTemplate,
) -> Response {
    let header = status_code.as_u16().to_string();

    (
        status_code,
        error_view(
            status_code.canonical_reason().unwrap_or("Server Error"),
            &header,
            &template.description,
            &template.fix,
        ),
    )
        .into_response()
}

/// Route handler serving the generic error page.
///
/// Linked from endpoints as the HTMX redirect target when an unexpected error
/// occurs at [endpoints::INTERNAL_ERROR_VIEW].
pub async fn get_internal_server_error_page() -> Response {
    render_internal_server_error(StatusCode::INTERNAL_SERVER_ERROR, Default::default())
}

/// An HTMX redirect to the generic error page, for handlers that respond to
/// HTMX requests.
pub fn get_internal_server_error_redirect() -> Response {
    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
        (),
    )
        .into_response()
}
