//! The admin audit log: recording and listing administrative actions.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{Error, user::UserID};

/// How many audit log entries the admin panel shows.
const AUDIT_LOG_LIMIT: usize = 50;

/// One administrative action recorded in the audit log.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminAction {
    /// The ID of the audit log entry.
    pub id: i64,
    /// The ID of the administrator who performed the action.
    pub admin_id: UserID,
    /// A short description of what was done, e.g. "promoted to admin".
    pub action: String,
    /// The email address of the user the action was applied to.
    pub target_email: String,
    /// When the action was performed.
    pub created_at: OffsetDateTime,
}

/// Create the admin action table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_admin_action_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS admin_action (
                id INTEGER PRIMARY KEY,
                admin_id INTEGER NOT NULL,
                action TEXT NOT NULL,
                target_email TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(admin_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Record an administrative action in the audit log.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn log_admin_action(
    admin_id: UserID,
    action: &str,
    target_email: &str,
    connection: &Connection,
) -> Result<AdminAction, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO admin_action (admin_id, action, target_email, created_at) \
        VALUES (?1, ?2, ?3, ?4)",
        (admin_id.as_i64(), action, target_email, created_at),
    )?;

    Ok(AdminAction {
        id: connection.last_insert_rowid(),
        admin_id,
        action: action.to_owned(),
        target_email: target_email.to_owned(),
        created_at,
    })
}

/// Get the most recent audit log entries, newest first.
///
/// At most fifty entries are returned.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_recent_admin_actions(connection: &Connection) -> Result<Vec<AdminAction>, Error> {
    connection
        .prepare(
            "SELECT id, admin_id, action, target_email, created_at FROM admin_action \
            ORDER BY created_at DESC, id DESC LIMIT :limit",
        )?
        .query_map(&[(":limit", &(AUDIT_LOG_LIMIT as i64))], |row| {
            map_admin_action_row(row)
        })?
        .map(|maybe_action| maybe_action.map_err(|error| error.into()))
        .collect()
}

fn map_admin_action_row(row: &Row) -> Result<AdminAction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_admin_id = row.get(1)?;
    let action = row.get(2)?;
    let target_email = row.get(3)?;
    let created_at = row.get(4)?;

    Ok(AdminAction {
        id,
        admin_id: UserID::new(raw_admin_id),
        action,
        target_email,
        created_at,
    })
}

#[cfg(test)]
mod admin_action_tests {
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        db::initialize,
        user::{Role, User, create_user},
    };

    use super::{get_recent_admin_actions, log_admin_action};

    fn get_test_admin() -> (Connection, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let admin = create_user(
            "admin@example.com",
            PasswordHash::new_unchecked("hunter2"),
            Role::Admin,
            &connection,
        )
        .unwrap();

        (connection, admin)
    }

    #[test]
    fn logged_actions_are_returned_newest_first() {
        let (connection, admin) = get_test_admin();

        log_admin_action(admin.id, "promoted to admin", "ava@example.com", &connection).unwrap();
        log_admin_action(admin.id, "deleted account", "ben@example.com", &connection).unwrap();

        let actions = get_recent_admin_actions(&connection).unwrap();

        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].action, "deleted account");
        assert_eq!(actions[0].target_email, "ben@example.com");
        assert_eq!(actions[1].action, "promoted to admin");
    }

    #[test]
    fn audit_log_is_capped_at_fifty_entries() {
        let (connection, admin) = get_test_admin();

        for i in 0..60 {
            log_admin_action(
                admin.id,
                "promoted to admin",
                &format!("user{i}@example.com"),
                &connection,
            )
            .unwrap();
        }

        let actions = get_recent_admin_actions(&connection).unwrap();

        assert_eq!(actions.len(), 50);
        // The newest entry was inserted last.
        assert_eq!(actions[0].target_email, "user59@example.com");
    }

    #[test]
    fn empty_audit_log_returns_no_entries() {
        let (connection, _) = get_test_admin();

        assert!(get_recent_admin_actions(&connection).unwrap().is_empty());
    }
}
