//! Pure reporting functions over a user's transactions.
//!
//! Everything in this module works on in-memory slices that the caller has
//! already fetched and authorized. Nothing here touches the database, and
//! inputs are never mutated.

mod budget;
mod category;
mod export;
mod monthly;

pub use budget::{BudgetProgress, BudgetStatus, calculate_progress};
pub use category::{
    CategorySummary, UNCATEGORIZED_LABEL, percentage_of_section, summarize_by_category,
    top_expense_categories,
};
pub use export::{
    ExportFormat, Report, ReportSummary, ReportTransaction, build_report, report_filename, to_csv,
    to_json_report, transactions_filename,
};
pub use monthly::{MonthlyBucket, aggregate_by_month, format_month_label};
