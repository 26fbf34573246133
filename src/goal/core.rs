//! Defines the core data model and database queries for monthly budget goals.

use rusqlite::{Connection, Row};
use time::Month;

use crate::{
    Error,
    database_id::{CategoryID, GoalID},
    user::UserID,
};

/// A monthly spending limit for one expense category.
///
/// Duplicate goals for the same category and month are tolerated and treated
/// independently.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetGoal {
    /// The ID of the budget goal.
    pub id: GoalID,
    /// The spending limit. Always greater than zero.
    pub amount: f64,
    /// The month the goal applies to.
    pub month: Month,
    /// The year the goal applies to.
    pub year: i32,
    /// The expense category the goal applies to.
    pub category_id: CategoryID,
    /// The user the goal belongs to.
    pub user_id: UserID,
}

/// Create the budget goal table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget_goal (
                id INTEGER PRIMARY KEY,
                amount REAL NOT NULL CHECK (amount > 0),
                month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
                year INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE CASCADE,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create a new budget goal in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidGoalAmount] if `amount` is zero or negative,
/// - or [Error::InvalidCategory] if `category_id` does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_goal(
    amount: f64,
    month: Month,
    year: i32,
    category_id: CategoryID,
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetGoal, Error> {
    if amount <= 0.0 {
        return Err(Error::InvalidGoalAmount(amount));
    }

    connection
        .execute(
            "INSERT INTO budget_goal (amount, month, year, category_id, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (amount, month as u8, year, category_id, user_id.as_i64()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(Some(category_id)),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(BudgetGoal {
        id,
        amount,
        month,
        year,
        category_id,
        user_id,
    })
}

/// Get all of `user_id`'s budget goals, newest month first.
///
/// # Errors
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_goals_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<BudgetGoal>, Error> {
    connection
        .prepare(
            "SELECT id, amount, month, year, category_id, user_id
             FROM budget_goal
             WHERE user_id = :user_id
             ORDER BY year DESC, month DESC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Delete the budget goal with `id` if it belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingGoal] if `id` does not refer to a goal owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_goal(id: GoalID, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget_goal WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    Ok(())
}

fn map_goal_row(row: &Row) -> Result<BudgetGoal, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let raw_month: u8 = row.get(2)?;
    let year = row.get(3)?;
    let category_id = row.get(4)?;
    let raw_user_id = row.get(5)?;

    let month = Month::try_from(raw_month).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Integer,
            Box::new(error),
        )
    })?;

    Ok(BudgetGoal {
        id,
        amount,
        month,
        year,
        category_id,
        user_id: UserID::new(raw_user_id),
    })
}

#[cfg(test)]
mod goal_database_tests {
    use rusqlite::Connection;
    use time::Month;

    use crate::{
        Error, PasswordHash,
        category::get_all_categories,
        db::initialize,
        user::{Role, UserID, create_user},
    };

    use super::{create_goal, delete_goal, get_goals_for_user};

    fn get_test_connection() -> (Connection, UserID, i64) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "test@example.com",
            PasswordHash::new_unchecked("hunter2"),
            Role::User,
            &conn,
        )
        .unwrap();
        let category_id = get_all_categories(&conn).unwrap()[0].id;

        (conn, user.id, category_id)
    }

    #[test]
    fn create_goal_succeeds() {
        let (conn, user_id, category_id) = get_test_connection();

        let goal = create_goal(500.0, Month::March, 2025, category_id, user_id, &conn).unwrap();

        assert!(goal.id > 0);
        assert_eq!(goal.amount, 500.0);
        assert_eq!(goal.month, Month::March);
        assert_eq!(goal.year, 2025);
    }

    #[test]
    fn create_goal_fails_on_zero_amount() {
        let (conn, user_id, category_id) = get_test_connection();

        let result = create_goal(0.0, Month::March, 2025, category_id, user_id, &conn);

        assert_eq!(result, Err(Error::InvalidGoalAmount(0.0)));
    }

    #[test]
    fn create_goal_fails_on_negative_amount() {
        let (conn, user_id, category_id) = get_test_connection();

        let result = create_goal(-10.0, Month::March, 2025, category_id, user_id, &conn);

        assert_eq!(result, Err(Error::InvalidGoalAmount(-10.0)));
    }

    #[test]
    fn create_goal_fails_on_invalid_category() {
        let (conn, user_id, _) = get_test_connection();

        let result = create_goal(500.0, Month::March, 2025, 999_999, user_id, &conn);

        assert_eq!(result, Err(Error::InvalidCategory(Some(999_999))));
    }

    #[test]
    fn duplicate_goals_are_allowed() {
        let (conn, user_id, category_id) = get_test_connection();
        create_goal(500.0, Month::March, 2025, category_id, user_id, &conn).unwrap();
        create_goal(300.0, Month::March, 2025, category_id, user_id, &conn).unwrap();

        let goals = get_goals_for_user(user_id, &conn).unwrap();

        assert_eq!(goals.len(), 2);
    }

    #[test]
    fn get_goals_round_trips_month() {
        let (conn, user_id, category_id) = get_test_connection();
        let created =
            create_goal(500.0, Month::December, 2024, category_id, user_id, &conn).unwrap();

        let goals = get_goals_for_user(user_id, &conn).unwrap();

        assert_eq!(goals, vec![created]);
    }

    #[test]
    fn delete_goal_removes_goal() {
        let (conn, user_id, category_id) = get_test_connection();
        let goal = create_goal(500.0, Month::March, 2025, category_id, user_id, &conn).unwrap();

        delete_goal(goal.id, user_id, &conn).unwrap();

        assert!(get_goals_for_user(user_id, &conn).unwrap().is_empty());
    }

    #[test]
    fn delete_goal_fails_for_missing_goal() {
        let (conn, user_id, _) = get_test_connection();

        let result = delete_goal(42, user_id, &conn);

        assert_eq!(result, Err(Error::DeleteMissingGoal));
    }
}
