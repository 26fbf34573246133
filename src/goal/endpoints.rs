//! Defines the endpoints for creating and deleting budget goals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Month;

use crate::{
    AppState, Error,
    alert::AlertTemplate,
    database_id::{CategoryID, GoalID},
    endpoints,
    goal::core::{create_goal, delete_goal},
    user::UserID,
};

/// The state needed to create or delete a budget goal.
#[derive(Clone)]
pub struct GoalApiState {
    /// The database connection for managing budget goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a budget goal.
#[derive(Debug, Deserialize)]
pub struct GoalForm {
    /// The monthly spending limit in dollars.
    pub amount: f64,
    /// The month the goal applies to, 1 through 12.
    pub month: u8,
    /// The year the goal applies to.
    pub year: i32,
    /// The expense category the goal applies to.
    pub category_id: CategoryID,
}

/// A route handler for creating a new budget goal, redirects to the goals view
/// on success.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_goal_endpoint(
    State(state): State<GoalApiState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<GoalForm>,
) -> Response {
    let month = match Month::try_from(form.month) {
        Ok(month) => month,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Invalid month",
                    &format!("{} is not a month. Pick a month between 1 and 12.", form.month),
                ),
            )
                .into_response();
        }
    };

    let connection = state.db_connection.lock().unwrap();

    if let Err(error) = create_goal(
        form.amount,
        month,
        form.year,
        form.category_id,
        user_id,
        &connection,
    ) {
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::GOALS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// A route handler for deleting a budget goal, redirects to the goals view on
/// success.
///
/// Only goals owned by the logged-in user can be deleted.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_goal_endpoint(
    State(state): State<GoalApiState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalID>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match delete_goal(goal_id, user_id, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DeleteMissingGoal) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete budget goal {goal_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod goal_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        body::Body,
        extract::{Path, State},
        http::{Response, StatusCode},
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::Month;

    use crate::{
        PasswordHash,
        category::get_all_categories,
        db::initialize,
        goal::core::{create_goal, get_goals_for_user},
        user::{Role, UserID, create_user},
    };

    use super::{GoalApiState, GoalForm, create_goal_endpoint, delete_goal_endpoint};

    fn get_test_state() -> (GoalApiState, UserID, i64) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            Role::User,
            &connection,
        )
        .unwrap();
        let category_id = get_all_categories(&connection).unwrap()[0].id;

        let state = GoalApiState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, user.id, category_id)
    }

    #[tokio::test]
    async fn can_create_goal() {
        let (state, user_id, category_id) = get_test_state();

        let form = GoalForm {
            amount: 500.0,
            month: 3,
            year: 2025,
            category_id,
        };

        let response = create_goal_endpoint(State(state.clone()), Extension(user_id), Form(form))
            .await
            .into_response();

        assert_redirects_to_goals_view(response);

        let connection = state.db_connection.lock().unwrap();
        let goals = get_goals_for_user(user_id, &connection).unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].amount, 500.0);
        assert_eq!(goals[0].month, Month::March);
        assert_eq!(goals[0].year, 2025);
    }

    #[tokio::test]
    async fn create_goal_rejects_invalid_month() {
        let (state, user_id, category_id) = get_test_state();

        let form = GoalForm {
            amount: 500.0,
            month: 13,
            year: 2025,
            category_id,
        };

        let response = create_goal_endpoint(State(state.clone()), Extension(user_id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_goals_for_user(user_id, &connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_goal_rejects_zero_amount() {
        let (state, user_id, category_id) = get_test_state();

        let form = GoalForm {
            amount: 0.0,
            month: 3,
            year: 2025,
            category_id,
        };

        let response = create_goal_endpoint(State(state), Extension(user_id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn can_delete_goal() {
        let (state, user_id, category_id) = get_test_state();
        let goal = {
            let connection = state.db_connection.lock().unwrap();
            create_goal(500.0, Month::March, 2025, category_id, user_id, &connection).unwrap()
        };

        let response = delete_goal_endpoint(State(state.clone()), Extension(user_id), Path(goal.id))
            .await
            .into_response();

        assert_redirects_to_goals_view(response);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_goals_for_user(user_id, &connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_goal_responds_not_found_for_missing_goal() {
        let (state, user_id, _) = get_test_state();

        let response = delete_goal_endpoint(State(state), Extension(user_id), Path(42))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_goal_ignores_other_users_goals() {
        let (state, user_id, category_id) = get_test_state();
        let other_user = {
            let connection = state.db_connection.lock().unwrap();
            create_user(
                "other@example.com",
                PasswordHash::new_unchecked("hunter2"),
                Role::User,
                &connection,
            )
            .unwrap()
        };
        let goal = {
            let connection = state.db_connection.lock().unwrap();
            create_goal(
                500.0,
                Month::March,
                2025,
                category_id,
                other_user.id,
                &connection,
            )
            .unwrap()
        };

        let response = delete_goal_endpoint(State(state.clone()), Extension(user_id), Path(goal.id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_goals_for_user(other_user.id, &connection).unwrap().len(),
            1
        );
    }

    #[track_caller]
    fn assert_redirects_to_goals_view(response: Response<Body>) {
        let location = response
            .headers()
            .get(HX_REDIRECT)
            .expect("expected response to have the header hx-redirect");
        assert_eq!(
            location, "/goals",
            "got redirect to {location:?}, want redirect to /goals"
        );
    }
}
