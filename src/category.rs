//! Shared reference data describing what a transaction was for.
//!
//! Categories are not per-user. A default set is seeded when the database is
//! first created.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryID, transaction::TransactionKind};

/// A category for grouping transactions, e.g. "Groceries", "Salary".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryID,
    /// The display name of the category.
    pub name: String,
    /// An emoji shown next to the category name.
    pub icon: String,
    /// A CSS hex color used for the category in charts and badges.
    pub color: String,
    /// Whether the category applies to income or expense transactions.
    pub kind: TransactionKind,
}

/// The default categories seeded into a fresh database.
const DEFAULT_CATEGORIES: [(&str, &str, &str, TransactionKind); 12] = [
    ("Food & Dining", "🍔", "#f97316", TransactionKind::Expense),
    ("Transport", "🚗", "#3b82f6", TransactionKind::Expense),
    ("Shopping", "🛍️", "#ec4899", TransactionKind::Expense),
    ("Entertainment", "🎬", "#a855f7", TransactionKind::Expense),
    ("Bills & Utilities", "💡", "#eab308", TransactionKind::Expense),
    ("Healthcare", "🏥", "#ef4444", TransactionKind::Expense),
    ("Housing", "🏠", "#14b8a6", TransactionKind::Expense),
    ("Other Expenses", "📦", "#6b7280", TransactionKind::Expense),
    ("Salary", "💼", "#22c55e", TransactionKind::Income),
    ("Freelance", "💻", "#10b981", TransactionKind::Income),
    ("Investments", "📈", "#06b6d4", TransactionKind::Income),
    ("Other Income", "💰", "#84cc16", TransactionKind::Income),
];

/// Create the category table and seed it with the default categories if it is
/// empty.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                icon TEXT NOT NULL,
                color TEXT NOT NULL,
                kind TEXT NOT NULL
                )",
        (),
    )?;

    let count: i64 = connection.query_row("SELECT COUNT(id) FROM category;", [], |row| row.get(0))?;

    if count == 0 {
        let mut statement = connection
            .prepare("INSERT INTO category (name, icon, color, kind) VALUES (?1, ?2, ?3, ?4)")?;

        for (name, icon, color, kind) in DEFAULT_CATEGORIES {
            statement.execute((name, icon, color, kind))?;
        }
    }

    Ok(())
}

/// Retrieve a single category by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `category_id` does not refer to a valid category,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_category(category_id: CategoryID, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, icon, color, kind FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered alphabetically by name.
///
/// # Errors
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, icon, color, kind FROM category ORDER BY name ASC;")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Map a database row to a Category.
pub fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let name = row.get(1)?;
    let icon = row.get(2)?;
    let color = row.get(3)?;
    let kind = row.get(4)?;

    Ok(Category {
        id,
        name,
        icon,
        color,
        kind,
    })
}

#[cfg(test)]
mod category_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{create_category_table, get_all_categories, get_category},
        transaction::TransactionKind,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_category_table(&connection).expect("Could not create category table");
        connection
    }

    #[test]
    fn fresh_table_is_seeded_with_defaults() {
        let connection = get_test_db_connection();

        let categories = get_all_categories(&connection).unwrap();

        assert!(!categories.is_empty());
        assert!(
            categories
                .iter()
                .any(|category| category.kind == TransactionKind::Income)
        );
        assert!(
            categories
                .iter()
                .any(|category| category.kind == TransactionKind::Expense)
        );
    }

    #[test]
    fn seeding_is_idempotent() {
        let connection = get_test_db_connection();
        let first_count = get_all_categories(&connection).unwrap().len();

        create_category_table(&connection).expect("Could not re-run table creation");

        let second_count = get_all_categories(&connection).unwrap().len();
        assert_eq!(first_count, second_count);
    }

    #[test]
    fn get_category_succeeds_for_seeded_category() {
        let connection = get_test_db_connection();
        let categories = get_all_categories(&connection).unwrap();
        let first = &categories[0];

        let retrieved = get_category(first.id, &connection).unwrap();

        assert_eq!(&retrieved, first);
    }

    #[test]
    fn get_category_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = get_category(999_999, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn categories_are_sorted_by_name() {
        let connection = get_test_db_connection();

        let categories = get_all_categories(&connection).unwrap();

        let names: Vec<&str> = categories
            .iter()
            .map(|category| category.name.as_str())
            .collect();
        let mut sorted_names = names.clone();
        sorted_names.sort();
        assert_eq!(names, sorted_names);
    }
}
