//! Groups transactions by category for breakdown tables and the expense pie
//! chart.

use std::cmp::Ordering;

use time::{Date, Month};

use crate::transaction::{CategorizedTransaction, TransactionKind};

/// The label under which transactions with no category are grouped.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
const UNCATEGORIZED_ICON: &str = "❔";
const UNCATEGORIZED_COLOR: &str = "#6b7280";

/// The maximum number of slices in the expense pie chart.
///
/// Smaller categories beyond this are dropped, not merged into an "other"
/// slice.
const PIE_CHART_CATEGORY_LIMIT: usize = 6;

/// The total amount and transaction count for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    /// The category name, or [UNCATEGORIZED_LABEL].
    pub name: String,
    /// The emoji shown next to the category name.
    pub icon: String,
    /// The CSS hex color used for the category in charts.
    pub color: String,
    /// The sum of the amounts of all transactions in the category.
    pub total: f64,
    /// How many transactions are in the category.
    pub count: u32,
}

/// Sum `transactions` of the given `kind` per category.
///
/// Categories are collected in first-seen order and then stable-sorted by
/// total, largest first, so equal totals keep their first-seen order.
/// Transactions with no category metadata are grouped under
/// [UNCATEGORIZED_LABEL].
pub fn summarize_by_category(
    transactions: &[CategorizedTransaction],
    kind: TransactionKind,
) -> Vec<CategorySummary> {
    let matching = transactions
        .iter()
        .filter(|transaction| transaction.kind == kind);

    let mut summaries = group_by_category(matching);

    summaries.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));

    summaries
}

/// Sum the given month's expenses per category and keep only the largest
/// categories, for the expense pie chart.
///
/// At most [PIE_CHART_CATEGORY_LIMIT] categories are returned, largest total
/// first.
pub fn top_expense_categories(
    transactions: &[CategorizedTransaction],
    year: i32,
    month: Month,
) -> Vec<CategorySummary> {
    let matching = transactions.iter().filter(|transaction| {
        transaction.kind == TransactionKind::Expense && in_month(transaction.date, year, month)
    });

    let mut summaries = group_by_category(matching);

    summaries.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    summaries.truncate(PIE_CHART_CATEGORY_LIMIT);

    summaries
}

/// What percentage of `section_total` does `total` make up?
///
/// Returns zero when `section_total` is zero or negative so that an empty
/// section renders as 0% rather than NaN.
pub fn percentage_of_section(total: f64, section_total: f64) -> f64 {
    if section_total > 0.0 {
        total / section_total * 100.0
    } else {
        0.0
    }
}

fn in_month(date: Date, year: i32, month: Month) -> bool {
    date.year() == year && date.month() == month
}

fn group_by_category<'a>(
    transactions: impl Iterator<Item = &'a CategorizedTransaction>,
) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = Vec::new();

    for transaction in transactions {
        let (name, icon, color) = match &transaction.category {
            Some(category) => (
                category.name.as_str(),
                category.icon.as_str(),
                category.color.as_str(),
            ),
            None => (
                UNCATEGORIZED_LABEL,
                UNCATEGORIZED_ICON,
                UNCATEGORIZED_COLOR,
            ),
        };

        match summaries.iter_mut().find(|summary| summary.name == name) {
            Some(summary) => {
                summary.total += transaction.amount;
                summary.count += 1;
            }
            None => summaries.push(CategorySummary {
                name: name.to_owned(),
                icon: icon.to_owned(),
                color: color.to_owned(),
                total: transaction.amount,
                count: 1,
            }),
        }
    }

    summaries
}

#[cfg(test)]
mod category_summary_tests {
    use time::{Month, macros::date};

    use crate::{
        category::Category,
        transaction::{CategorizedTransaction, TransactionKind},
    };

    use super::{
        UNCATEGORIZED_LABEL, percentage_of_section, summarize_by_category, top_expense_categories,
    };

    fn expense(amount: f64, date: time::Date, category: Option<&str>) -> CategorizedTransaction {
        transaction(amount, TransactionKind::Expense, date, category)
    }

    fn transaction(
        amount: f64,
        kind: TransactionKind,
        date: time::Date,
        category: Option<&str>,
    ) -> CategorizedTransaction {
        // Derive a stable fake ID from the category name so that equal names
        // share a category row, like the LEFT JOIN output would.
        let category = category.map(|name| Category {
            id: name.len() as i64,
            name: name.to_owned(),
            icon: "🧪".to_owned(),
            color: "#000000".to_owned(),
            kind,
        });

        CategorizedTransaction {
            id: 0,
            amount,
            kind,
            date,
            description: None,
            category,
        }
    }

    #[test]
    fn totals_and_counts_are_summed_per_category() {
        let transactions = vec![
            expense(10.0, date!(2025 - 01 - 05), Some("Groceries")),
            expense(20.0, date!(2025 - 01 - 08), Some("Groceries")),
            expense(5.0, date!(2025 - 01 - 09), Some("Transport")),
        ];

        let summaries = summarize_by_category(&transactions, TransactionKind::Expense);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "Groceries");
        assert_eq!(summaries[0].total, 30.0);
        assert_eq!(summaries[0].count, 2);
        assert_eq!(summaries[1].name, "Transport");
        assert_eq!(summaries[1].total, 5.0);
        assert_eq!(summaries[1].count, 1);
    }

    #[test]
    fn summary_totals_preserve_input_sum() {
        let transactions = vec![
            expense(12.5, date!(2025 - 01 - 01), Some("Groceries")),
            expense(7.25, date!(2025 - 01 - 02), Some("Transport")),
            expense(100.0, date!(2025 - 01 - 03), None),
            expense(0.75, date!(2025 - 01 - 04), Some("Groceries")),
        ];
        let input_sum: f64 = transactions
            .iter()
            .map(|transaction| transaction.amount)
            .sum();

        let summaries = summarize_by_category(&transactions, TransactionKind::Expense);

        let summary_sum: f64 = summaries.iter().map(|summary| summary.total).sum();
        assert_eq!(input_sum, summary_sum);
    }

    #[test]
    fn only_requested_kind_is_summarized() {
        let transactions = vec![
            expense(10.0, date!(2025 - 01 - 05), Some("Groceries")),
            transaction(
                1000.0,
                TransactionKind::Income,
                date!(2025 - 01 - 05),
                Some("Salary"),
            ),
        ];

        let summaries = summarize_by_category(&transactions, TransactionKind::Income);

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "Salary");
    }

    #[test]
    fn missing_category_groups_under_uncategorized() {
        let transactions = vec![
            expense(10.0, date!(2025 - 01 - 05), None),
            expense(15.0, date!(2025 - 01 - 06), None),
        ];

        let summaries = summarize_by_category(&transactions, TransactionKind::Expense);

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, UNCATEGORIZED_LABEL);
        assert_eq!(summaries[0].total, 25.0);
    }

    #[test]
    fn summaries_are_sorted_by_total_descending() {
        let transactions = vec![
            expense(5.0, date!(2025 - 01 - 01), Some("Transport")),
            expense(50.0, date!(2025 - 01 - 02), Some("Groceries")),
            expense(20.0, date!(2025 - 01 - 03), Some("Entertainment")),
        ];

        let summaries = summarize_by_category(&transactions, TransactionKind::Expense);

        let names: Vec<&str> = summaries
            .iter()
            .map(|summary| summary.name.as_str())
            .collect();
        assert_eq!(names, vec!["Groceries", "Entertainment", "Transport"]);
    }

    #[test]
    fn equal_totals_keep_first_seen_order() {
        let transactions = vec![
            expense(10.0, date!(2025 - 01 - 01), Some("Transport")),
            expense(10.0, date!(2025 - 01 - 02), Some("Groceries")),
        ];

        let summaries = summarize_by_category(&transactions, TransactionKind::Expense);

        let names: Vec<&str> = summaries
            .iter()
            .map(|summary| summary.name.as_str())
            .collect();
        assert_eq!(names, vec!["Transport", "Groceries"]);
    }

    #[test]
    fn empty_input_produces_no_summaries() {
        let summaries = summarize_by_category(&[], TransactionKind::Expense);

        assert!(summaries.is_empty());
    }

    #[test]
    fn pie_chart_keeps_at_most_six_categories() {
        let names = [
            "A", "B", "C", "D", "E", "F", "G", "H",
        ];
        let transactions: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                expense(
                    100.0 - 10.0 * i as f64,
                    date!(2025 - 01 - 05),
                    Some(name),
                )
            })
            .collect();

        let slices = top_expense_categories(&transactions, 2025, Month::January);

        assert_eq!(slices.len(), 6);
        assert_eq!(slices[0].total, 100.0);
        assert_eq!(slices[5].total, 50.0);
    }

    #[test]
    fn pie_chart_ignores_other_months_and_income() {
        let transactions = vec![
            expense(10.0, date!(2025 - 01 - 05), Some("Groceries")),
            expense(99.0, date!(2025 - 02 - 05), Some("Groceries")),
            expense(42.0, date!(2024 - 01 - 05), Some("Groceries")),
            transaction(
                1000.0,
                TransactionKind::Income,
                date!(2025 - 01 - 05),
                Some("Salary"),
            ),
        ];

        let slices = top_expense_categories(&transactions, 2025, Month::January);

        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].total, 10.0);
    }

    #[test]
    fn percentage_is_zero_when_section_total_is_zero() {
        assert_eq!(percentage_of_section(10.0, 0.0), 0.0);
    }

    #[test]
    fn percentage_is_proportional_to_section_total() {
        assert_eq!(percentage_of_section(25.0, 100.0), 25.0);
        assert_eq!(percentage_of_section(100.0, 100.0), 100.0);
    }
}
