//! Read queries that join transactions with their category metadata.
//!
//! The reporting code works over [CategorizedTransaction] slices so that it
//! never has to touch the database itself.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    category::Category,
    database_id::TransactionID,
    transaction::TransactionKind,
    user::UserID,
};

/// A transaction joined with its category metadata, ready for display and
/// reporting.
///
/// The category is optional: a transaction keeps existing when its category is
/// deleted, and reports group such transactions under an "Uncategorized"
/// label.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedTransaction {
    /// The ID of the transaction.
    pub id: TransactionID,
    /// The non-negative magnitude of the transaction.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// When the transaction happened.
    pub date: Date,
    /// An optional text description of what the transaction was for.
    pub description: Option<String>,
    /// The category the transaction belongs to, if it still exists.
    pub category: Option<Category>,
}

const SELECT_CATEGORIZED: &str = "
    SELECT t.id, t.amount, t.kind, t.date, t.description,
           c.id, c.name, c.icon, c.color, c.kind
    FROM \"transaction\" t
    LEFT JOIN category c ON c.id = t.category_id
    WHERE t.user_id = :user_id
    ORDER BY t.date DESC, t.id DESC";

/// Get all of `user_id`'s transactions with their category metadata, newest
/// first.
///
/// # Errors
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_categorized_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CategorizedTransaction>, Error> {
    connection
        .prepare(SELECT_CATEGORIZED)?
        .query_map(&[(":user_id", &user_id.as_i64())], map_categorized_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

fn map_categorized_row(row: &Row) -> Result<CategorizedTransaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let kind = row.get(2)?;
    let date = row.get(3)?;
    let description = row.get(4)?;

    // The LEFT JOIN produces all NULL category columns when the transaction
    // has no category.
    let category_id: Option<i64> = row.get(5)?;
    let category = match category_id {
        Some(category_id) => Some(Category {
            id: category_id,
            name: row.get(6)?,
            icon: row.get(7)?,
            color: row.get(8)?,
            kind: row.get(9)?,
        }),
        None => None,
    };

    Ok(CategorizedTransaction {
        id,
        amount,
        kind,
        date,
        description,
        category,
    })
}
