//! Creating and initializing the application database.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    admin::create_admin_action_table, category::create_category_table,
    goal::create_goal_table, transaction::create_transaction_table, user::create_user_table,
};

/// Create the application tables and seed the default categories.
///
/// Safe to call on an existing database, tables are only created when they do
/// not exist yet.
///
/// # Errors
///
/// This function will return an error if an SQL query failed.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    // Foreign keys are off by default in SQLite and must be enabled per
    // connection, otherwise the category and user references go unchecked.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_goal_table(&transaction)?;
    create_admin_action_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
