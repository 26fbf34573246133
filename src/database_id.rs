//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;
/// The ID of a transaction row.
pub type TransactionID = i64;
/// The ID of a category row.
pub type CategoryID = i64;
/// The ID of a budget goal row.
pub type GoalID = i64;
