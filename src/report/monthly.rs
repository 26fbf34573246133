//! Buckets transactions into calendar months for the income/expense trend
//! chart.

use std::collections::HashMap;

use time::{Date, Month};

use crate::transaction::{CategorizedTransaction, TransactionKind};

/// The income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBucket {
    /// The month the bucket covers, as the first day of that month.
    ///
    /// Bucketing is keyed on this date, never on the display label.
    pub month: Date,
    /// The sum of income amounts in the month.
    pub income: f64,
    /// The sum of expense amounts in the month.
    pub expenses: f64,
}

impl MonthlyBucket {
    /// How much money was left over at the end of the month.
    ///
    /// Negative when more was spent than earned.
    pub fn savings(&self) -> f64 {
        self.income - self.expenses
    }

    /// The display label for the bucket, e.g. "Jan 2025".
    pub fn label(&self) -> String {
        format_month_label(self.month)
    }
}

/// Sum income and expenses per calendar month, oldest month first.
///
/// Months with no transactions are absent from the output, there is no gap
/// filling.
pub fn aggregate_by_month(transactions: &[CategorizedTransaction]) -> Vec<MonthlyBucket> {
    let mut totals_by_month: HashMap<Date, (f64, f64)> = HashMap::new();

    for transaction in transactions {
        // Day one is always a valid day, so replace_day cannot fail here.
        let month = transaction.date.replace_day(1).unwrap();
        let (income, expenses) = totals_by_month.entry(month).or_insert((0.0, 0.0));

        match transaction.kind {
            TransactionKind::Income => *income += transaction.amount,
            TransactionKind::Expense => *expenses += transaction.amount,
        }
    }

    let mut buckets: Vec<MonthlyBucket> = totals_by_month
        .into_iter()
        .map(|(month, (income, expenses))| MonthlyBucket {
            month,
            income,
            expenses,
        })
        .collect();

    buckets.sort_by_key(|bucket| bucket.month);

    buckets
}

/// Format a date as a short month label, e.g. "Jan 2025".
pub fn format_month_label(date: Date) -> String {
    let month = match date.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    format!("{} {}", month, date.year())
}

#[cfg(test)]
mod monthly_bucket_tests {
    use time::macros::date;

    use crate::transaction::{CategorizedTransaction, TransactionKind};

    use super::{MonthlyBucket, aggregate_by_month, format_month_label};

    fn transaction(amount: f64, kind: TransactionKind, date: time::Date) -> CategorizedTransaction {
        CategorizedTransaction {
            id: 0,
            amount,
            kind,
            date,
            description: None,
            category: None,
        }
    }

    #[test]
    fn buckets_are_keyed_on_calendar_month() {
        let transactions = vec![
            transaction(10.0, TransactionKind::Expense, date!(2025 - 01 - 05)),
            transaction(20.0, TransactionKind::Expense, date!(2025 - 01 - 28)),
            transaction(100.0, TransactionKind::Income, date!(2025 - 01 - 15)),
        ];

        let buckets = aggregate_by_month(&transactions);

        assert_eq!(
            buckets,
            vec![MonthlyBucket {
                month: date!(2025 - 01 - 01),
                income: 100.0,
                expenses: 30.0,
            }]
        );
    }

    #[test]
    fn buckets_are_sorted_chronologically_across_year_boundaries() {
        let transactions = vec![
            transaction(1.0, TransactionKind::Expense, date!(2025 - 02 - 01)),
            transaction(1.0, TransactionKind::Expense, date!(2024 - 12 - 31)),
            transaction(1.0, TransactionKind::Expense, date!(2025 - 01 - 15)),
        ];

        let buckets = aggregate_by_month(&transactions);

        let months: Vec<_> = buckets.iter().map(|bucket| bucket.month).collect();
        assert_eq!(
            months,
            vec![
                date!(2024 - 12 - 01),
                date!(2025 - 01 - 01),
                date!(2025 - 02 - 01)
            ]
        );
    }

    #[test]
    fn months_without_transactions_are_absent() {
        let transactions = vec![
            transaction(1.0, TransactionKind::Expense, date!(2025 - 01 - 15)),
            transaction(1.0, TransactionKind::Expense, date!(2025 - 03 - 15)),
        ];

        let buckets = aggregate_by_month(&transactions);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].month, date!(2025 - 01 - 01));
        assert_eq!(buckets[1].month, date!(2025 - 03 - 01));
    }

    #[test]
    fn savings_can_be_negative() {
        let transactions = vec![
            transaction(50.0, TransactionKind::Income, date!(2025 - 01 - 05)),
            transaction(80.0, TransactionKind::Expense, date!(2025 - 01 - 06)),
        ];

        let buckets = aggregate_by_month(&transactions);

        assert_eq!(buckets[0].savings(), -30.0);
    }

    #[test]
    fn empty_input_produces_no_buckets() {
        assert!(aggregate_by_month(&[]).is_empty());
    }

    #[test]
    fn labels_use_short_month_and_year() {
        assert_eq!(format_month_label(date!(2025 - 01 - 01)), "Jan 2025");
        assert_eq!(format_month_label(date!(2024 - 12 - 01)), "Dec 2024");
    }
}
