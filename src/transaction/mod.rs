//! Recording, listing and deleting income/expense transactions.

mod core;
mod endpoints;
mod pages;
mod query;

pub use core::{
    Transaction, TransactionBuilder, TransactionKind, count_transactions, create_transaction,
    create_transaction_table, delete_transaction, get_transaction,
};
pub use endpoints::{create_transaction_endpoint, delete_transaction_endpoint};
pub use pages::{TransactionsPageState, get_transactions_page};
pub use query::{CategorizedTransaction, get_categorized_transactions};
