//! Defines the route handler for the admin panel.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    admin::core::{AdminAction, get_recent_admin_actions},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    user::{Role, User, UserID, get_all_users},
};

/// The state needed for the admin panel page.
#[derive(Clone)]
pub struct AdminPageState {
    /// The database connection for reading users and the audit log.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AdminPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the admin panel with the user list and the audit log.
///
/// The routing layer only lets administrators reach this handler.
pub async fn get_admin_page(
    State(state): State<AdminPageState>,
    Extension(admin_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let users = get_all_users(&connection)?;
    let actions = get_recent_admin_actions(&connection)?;
    drop(connection);

    let nav_bar = NavBar::new(endpoints::ADMIN_VIEW).with_admin_link(endpoints::ADMIN_VIEW);

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl"
            {
                h1 class="text-2xl font-bold mb-4" { "Admin" }

                (user_table(&users, admin_id))

                h2 class="text-xl font-semibold mt-8 mb-4" { "Audit Log" }
                (audit_log(&actions))
            }
        }
    };

    Ok(base("Admin", &[], &content).into_response())
}

fn user_table(users: &[User], admin_id: UserID) -> Markup {
    html! {
        div class="w-full overflow-x-auto"
        {
            table class="w-full text-left"
            {
                thead
                {
                    tr
                    {
                        th class=(TABLE_HEADER_STYLE) { "Email" }
                        th class=(TABLE_HEADER_STYLE) { "Role" }
                        th class=(TABLE_HEADER_STYLE) { "Registered" }
                        th class=(TABLE_HEADER_STYLE) { span class="sr-only" { "Actions" } }
                    }
                }

                tbody
                {
                    @for user in users {
                        (user_row(user, user.id == admin_id))
                    }
                }
            }
        }
    }
}

fn user_row(user: &User, is_self: bool) -> Markup {
    let (next_role, toggle_label) = match user.role {
        Role::User => (Role::Admin, "Make admin"),
        Role::Admin => (Role::User, "Make user"),
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                (user.email)
                @if is_self {
                    span class="ml-2 text-xs text-gray-500 dark:text-gray-400" { "(you)" }
                }
            }
            td class=(TABLE_CELL_STYLE) { (user.role) }
            td class=(TABLE_CELL_STYLE) { (user.created_at.date()) }
            td class=(TABLE_CELL_STYLE)
            {
                // A user cannot change or delete their own account here.
                @if !is_self {
                    div class="flex gap-4"
                    {
                        button
                            hx-post=(format_endpoint(endpoints::ADMIN_USER_ROLE, user.id.as_i64()))
                            hx-vals=(format!(r#"{{"role": "{next_role}"}}"#))
                            hx-target-error="#alert-container"
                            class="text-blue-600 hover:text-blue-500 dark:text-blue-500 \
                                dark:hover:text-blue-400 underline bg-transparent border-none \
                                cursor-pointer"
                        {
                            (toggle_label)
                        }

                        button
                            hx-delete=(format_endpoint(endpoints::ADMIN_USER, user.id.as_i64()))
                            hx-confirm=(format!(
                                "Delete {} and all their data? This cannot be undone.",
                                user.email
                            ))
                            hx-target-error="#alert-container"
                            class=(BUTTON_DELETE_STYLE)
                        {
                            "Delete"
                        }
                    }
                }
            }
        }
    }
}

fn audit_log(actions: &[AdminAction]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            @if actions.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No admin actions recorded yet." }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for action in actions {
                        li class="py-2 text-sm"
                        {
                            span class="font-medium" { (action.target_email) }
                            " " (action.action)
                            span class="ml-2 text-gray-500 dark:text-gray-400"
                            {
                                (action.created_at.date())
                            }
                        }
                    }
                }
            }
        }
    }
}
