//! Formats a user's transactions for download as CSV or a JSON report.

use std::{fmt::Display, str::FromStr};

use serde::Serialize;
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error,
    report::category::UNCATEGORIZED_LABEL,
    transaction::{CategorizedTransaction, TransactionKind},
};

/// The download formats the export endpoint supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// A flat CSV file of transactions.
    Csv,
    /// A JSON report with transactions plus summary totals.
    Json,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(Error::UnsupportedExportFormat(other.to_owned())),
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

/// The attachment filename for a CSV export started on `date`.
pub fn transactions_filename(date: Date) -> String {
    format!("budgetwise-transactions-{date}.csv")
}

/// The attachment filename for a JSON report started on `date`.
pub fn report_filename(date: Date) -> String {
    format!("budgetwise-report-{date}.json")
}

/// Render `transactions` as CSV.
///
/// Every field is wrapped in double quotes. Quotes inside fields are not
/// escaped, this matches the format the export has always produced and is a
/// known limitation. Rows are joined with a line feed and there is no
/// trailing newline. A missing description becomes an empty quoted field.
pub fn to_csv(transactions: &[CategorizedTransaction]) -> String {
    let header = r#""Date","Type","Category","Description","Amount""#;

    let mut lines = Vec::with_capacity(transactions.len() + 1);
    lines.push(header.to_owned());

    for transaction in transactions {
        lines.push(format!(
            r#""{}","{}","{}","{}","{}""#,
            transaction.date,
            transaction.kind,
            category_name(transaction),
            transaction.description.as_deref().unwrap_or(""),
            transaction.amount,
        ));
    }

    lines.join("\n")
}

/// One transaction as it appears in the JSON report.
#[derive(Debug, Serialize, PartialEq)]
pub struct ReportTransaction {
    /// The transaction date as an ISO calendar date string.
    pub date: String,
    /// "income" or "expense".
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The category name, or the uncategorized label.
    pub category: String,
    /// The description, if the transaction has one.
    pub description: Option<String>,
    /// The transaction amount.
    pub amount: f64,
}

/// Summary totals across every transaction in a report.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// How many transactions are in the report.
    pub total_transactions: usize,
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expenses: f64,
}

/// A full JSON export of a user's transactions.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// When the report was generated, as an RFC 3339 date-time string.
    pub export_date: String,
    /// The email address of the user the report belongs to.
    pub user: String,
    /// Every transaction in the report, in the order they were given.
    pub transactions: Vec<ReportTransaction>,
    /// Totals across the whole report.
    pub summary: ReportSummary,
}

/// Build a JSON report over `transactions` for the user with `user_email`.
///
/// The summary totals are plain sums per transaction kind, so they agree
/// exactly with the per-category totals reported elsewhere over the same
/// input.
///
/// # Errors
/// Returns [Error::InvalidDateFormat] if `export_date` cannot be formatted as
/// RFC 3339.
pub fn build_report(
    transactions: &[CategorizedTransaction],
    user_email: &str,
    export_date: OffsetDateTime,
) -> Result<Report, Error> {
    let export_date = export_date
        .format(&Rfc3339)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), export_date.to_string()))?;

    let total_income = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Income)
        .map(|transaction| transaction.amount)
        .sum();
    let total_expenses = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
        .map(|transaction| transaction.amount)
        .sum();

    Ok(Report {
        export_date,
        user: user_email.to_owned(),
        transactions: transactions
            .iter()
            .map(|transaction| ReportTransaction {
                date: transaction.date.to_string(),
                kind: transaction.kind,
                category: category_name(transaction).to_owned(),
                description: transaction.description.clone(),
                amount: transaction.amount,
            })
            .collect(),
        summary: ReportSummary {
            total_transactions: transactions.len(),
            total_income,
            total_expenses,
        },
    })
}

/// Serialize a report built by [build_report] as a JSON string.
///
/// # Errors
/// Returns [Error::JSONSerializationError] if serialization fails.
pub fn to_json_report(
    transactions: &[CategorizedTransaction],
    user_email: &str,
    export_date: OffsetDateTime,
) -> Result<String, Error> {
    let report = build_report(transactions, user_email, export_date)?;

    serde_json::to_string(&report).map_err(|error| Error::JSONSerializationError(error.to_string()))
}

fn category_name(transaction: &CategorizedTransaction) -> &str {
    transaction
        .category
        .as_ref()
        .map(|category| category.name.as_str())
        .unwrap_or(UNCATEGORIZED_LABEL)
}
