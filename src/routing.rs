//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    admin::{delete_user_endpoint, get_admin_page, post_user_role},
    analytics::get_analytics_page,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        post_register_user, require_admin,
    },
    dashboard::get_dashboard_page,
    endpoints,
    export::get_export,
    goal::{create_goal_endpoint, delete_goal_endpoint, get_goals_page},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{create_transaction_endpoint, delete_transaction_endpoint, get_transactions_page},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(post_register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::ANALYTICS_VIEW, get(get_analytics_page))
        .route(endpoints::GOALS_VIEW, get(get_goals_page))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These API routes need to use the HX-Redirect header for auth redirects
    // to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint),
            )
            .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
            .route(endpoints::GOALS_API, post(create_goal_endpoint))
            .route(endpoints::GOAL, delete(delete_goal_endpoint))
            .route(endpoints::EXPORT, get(get_export))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    // Admin routes layer the role check inside the auth guard so the guard
    // runs first and sets the user ID extension the role check reads.
    let admin_routes = Router::new()
        .route(endpoints::ADMIN_VIEW, get(get_admin_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
        .merge(
            Router::new()
                .route(endpoints::ADMIN_USER_ROLE, post(post_user_role))
                .route(endpoints::ADMIN_USER, delete(delete_user_endpoint))
                .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
        );

    protected_routes
        .merge(unprotected_routes)
        .merge(admin_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
