//! BudgetWise is a web app for tracking personal income and spending against
//! monthly budget goals.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use maud::Markup;
use tokio::signal;

mod admin;
mod alert;
mod analytics;
mod app_state;
mod auth;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod export;
mod goal;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod password;
mod report;
mod routing;
mod timezone;
mod transaction;
mod user;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{Role, User, UserID, create_user, get_user_by_email};

use crate::{
    alert::AlertTemplate,
    database_id::CategoryID,
    internal_server_error::{InternalServerErrorPageTemplate, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// Render a maud template with the given status code.
fn render(status_code: StatusCode, template: Markup) -> Response {
    (status_code, template).into_response()
}

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address used at registration already belongs to an account.
    #[error("the email address is already registered")]
    EmailTaken,

    /// A negative amount was used to create a transaction.
    ///
    /// The sign of a transaction is carried by its kind (income or expense),
    /// so stored amounts must always be non-negative magnitudes.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(f64),

    /// The category ID used to create a transaction or budget goal did not
    /// refer to a valid category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryID>),

    /// A budget goal has a zero or negative amount.
    ///
    /// A zero-amount goal would make the progress percentage a division by
    /// zero, and is a data-entry defect rather than a state worth rendering.
    #[error("{0} is not a valid budget goal amount")]
    InvalidGoalAmount(f64),

    /// An export was requested in a format other than CSV or JSON.
    #[error("unsupported export format \"{0}\"")]
    UnsupportedExportFormat(String),

    /// The logged-in user tried to access an admin-only resource.
    #[error("this resource is only available to administrators")]
    Forbidden,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a budget goal that does not exist.
    #[error("tried to delete a budget goal that is not in the database")]
    DeleteMissingGoal,

    /// Tried to update or delete a user that does not exist.
    #[error("tried to modify a user that is not in the database")]
    MissingUser,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::EmailTaken
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::Forbidden => render_internal_server_error(
                StatusCode::FORBIDDEN,
                InternalServerErrorPageTemplate {
                    description: "Access Denied".to_owned(),
                    fix: "This page is only available to administrators.".to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => render_internal_server_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                InternalServerErrorPageTemplate {
                    description: "Invalid Timezone Settings".to_owned(),
                    fix: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings \
                        and ensure the timezone has been set to a valid, canonical timezone string."
                    ),
                },
            ),
            Error::DatabaseLockError => {
                render_internal_server_error(StatusCode::INTERNAL_SERVER_ERROR, Default::default())
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(StatusCode::INTERNAL_SERVER_ERROR, Default::default())
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTMX-friendly alert fragment response.
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidCredentials => render(
                StatusCode::UNAUTHORIZED,
                AlertTemplate::error(
                    "Could not log in",
                    "The email or password is incorrect. Check for typos and try again.",
                ),
            ),
            Error::EmailTaken => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Email already registered",
                    "An account with this email address already exists. \
                    Log in instead, or use a different email address.",
                ),
            ),
            Error::TooWeak(suggestion) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error("Password is too weak", &suggestion),
            ),
            Error::NegativeAmount(amount) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid amount",
                    &format!(
                        "{amount} is a negative amount. Enter the amount as a positive number \
                        and pick income or expense instead."
                    ),
                ),
            ),
            Error::InvalidCategory(category_id) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid category",
                    &format!("Could not find a category with the ID {category_id:?}."),
                ),
            ),
            Error::InvalidGoalAmount(amount) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid budget amount",
                    &format!(
                        "{amount} is not a valid monthly budget. Enter an amount greater than zero."
                    ),
                ),
            ),
            Error::UnsupportedExportFormat(format) => render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Unsupported export format",
                    &format!("\"{format}\" is not a supported export format. Choose CSV or JSON."),
                ),
            ),
            Error::Forbidden => render(
                StatusCode::FORBIDDEN,
                AlertTemplate::error(
                    "Access denied",
                    "This action is only available to administrators.",
                ),
            ),
            Error::DeleteMissingTransaction => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete transaction",
                    "The transaction could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                ),
            ),
            Error::DeleteMissingGoal => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error(
                    "Could not delete budget goal",
                    "The budget goal could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                ),
            ),
            Error::MissingUser => render(
                StatusCode::NOT_FOUND,
                AlertTemplate::error("Could not update user", "The user could not be found."),
            ),
            _ => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertTemplate::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        }
    }
}
