//! Defines the admin-only endpoints for changing user roles and deleting
//! users.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    admin::core::log_admin_action,
    alert::AlertTemplate,
    endpoints,
    user::{Role, UserID, delete_user, get_user_by_id, set_user_role},
};

/// The state needed for the admin user management endpoints.
#[derive(Clone)]
pub struct AdminApiState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AdminApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for changing a user's role.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    /// The role to give the user.
    pub role: Role,
}

/// A route handler for changing another user's role, redirects to the admin
/// panel on success.
///
/// Administrators cannot change their own role, so there is always at least
/// one admin left.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn post_user_role(
    State(state): State<AdminApiState>,
    Extension(admin_id): Extension<UserID>,
    Path(user_id): Path<UserID>,
    Form(form): Form<RoleForm>,
) -> Response {
    if user_id == admin_id {
        return (
            StatusCode::BAD_REQUEST,
            AlertTemplate::error(
                "Could not change role",
                "You cannot change your own role. Ask another administrator to do it.",
            ),
        )
            .into_response();
    }

    let connection = state.db_connection.lock().unwrap();

    let target = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Error::MissingUser.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = set_user_role(user_id, form.role, &connection) {
        return error.into_alert_response();
    }

    let action = match form.role {
        Role::Admin => "promoted to admin",
        Role::User => "demoted to user",
    };

    if let Err(error) = log_admin_action(admin_id, action, &target.email, &connection) {
        tracing::error!("could not record admin action: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::ADMIN_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// A route handler for deleting another user and their data, redirects to the
/// admin panel on success.
///
/// Administrators cannot delete their own account from the admin panel.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_user_endpoint(
    State(state): State<AdminApiState>,
    Extension(admin_id): Extension<UserID>,
    Path(user_id): Path<UserID>,
) -> Response {
    if user_id == admin_id {
        return (
            StatusCode::BAD_REQUEST,
            AlertTemplate::error(
                "Could not delete user",
                "You cannot delete your own account from the admin panel.",
            ),
        )
            .into_response();
    }

    let connection = state.db_connection.lock().unwrap();

    let target = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Error::MissingUser.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = delete_user(user_id, &connection) {
        tracing::error!("could not delete user {user_id}: {error}");
        return error.into_alert_response();
    }

    if let Err(error) = log_admin_action(admin_id, "deleted account", &target.email, &connection) {
        tracing::error!("could not record admin action: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::ADMIN_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
