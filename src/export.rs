//! The endpoint for downloading a user's transactions as CSV or a JSON
//! report.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    report::{ExportFormat, report_filename, to_csv, to_json_report, transactions_filename},
    timezone::get_local_offset,
    transaction::get_categorized_transactions,
    user::{UserID, get_user_by_id},
};

/// The state needed for exporting a user's transactions.
#[derive(Clone)]
pub struct ExportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string for the export endpoint.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// The requested download format, "csv" or "json".
    pub format: String,
}

/// A route handler that produces a file download of the user's transactions.
///
/// An unsupported format is rejected with a 400 response before any data is
/// read.
pub async fn get_export(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ExportQuery>,
) -> Response {
    let format = match query.format.parse::<ExportFormat>() {
        Ok(format) => format,
        Err(error) => return error.into_alert_response(),
    };

    match build_export(format, user_id, &state) {
        Ok(response) => response,
        Err(error) => {
            tracing::error!("could not export transactions as {format}: {error}");
            error.into_alert_response()
        }
    }
}

fn build_export(
    format: ExportFormat,
    user_id: UserID,
    state: &ExportState,
) -> Result<Response, Error> {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Err(Error::InvalidTimezoneError(state.local_timezone.clone()));
    };
    let now = OffsetDateTime::now_utc().to_offset(local_offset);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let user = get_user_by_id(user_id, &connection)?;
    let transactions = get_categorized_transactions(user_id, &connection)?;
    drop(connection);

    let (body, content_type, filename) = match format {
        ExportFormat::Csv => (
            to_csv(&transactions),
            "text/csv",
            transactions_filename(now.date()),
        ),
        ExportFormat::Json => (
            to_json_report(&transactions, &user.email, now)?,
            "application/json",
            report_filename(now.date()),
        ),
    };

    Ok((
        [
            (CONTENT_TYPE, content_type.to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}
