//! The 404 page served when no route matches.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// Route handler serving the 404 page, used as the router fallback.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

/// Build the 404 page response.
pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Page Not Found",
            "404",
            "Sorry, we couldn't find that page.",
            "Check the address for typos, or head back to the dashboard.",
        ),
    )
        .into_response()
}
