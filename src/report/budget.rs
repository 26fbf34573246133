//! Calculates how far along a budget goal is for its month.

use crate::{
    Error,
    goal::BudgetGoal,
    transaction::{CategorizedTransaction, TransactionKind},
};

/// How a budget goal is doing, derived from its progress percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// At most half the budget has been spent.
    OnTrack,
    /// More than half but at most 80% of the budget has been spent.
    Warning,
    /// More than 80% of the budget has been spent, but it is not blown yet.
    Close,
    /// More than the whole budget has been spent.
    OverBudget,
}

impl BudgetStatus {
    /// A short human-readable description of the status.
    pub fn label(&self) -> &'static str {
        match self {
            BudgetStatus::OnTrack => "On track",
            BudgetStatus::Warning => "Watch your spending",
            BudgetStatus::Close => "Close to the limit",
            BudgetStatus::OverBudget => "Over budget",
        }
    }
}

/// How much of a budget goal has been used up.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    /// The total spent against the goal's category in the goal's month.
    pub spent: f64,
    /// How much of the budget has been used, as a percentage.
    ///
    /// May exceed 100 when the budget is blown, use [BudgetProgress::bar_percentage]
    /// for rendering progress bars.
    pub percentage: f64,
    /// How much budget is left. Never negative.
    pub remaining: f64,
    /// The status bucket the percentage falls into.
    pub status: BudgetStatus,
}

impl BudgetProgress {
    /// The progress percentage clamped to the range a progress bar can show.
    pub fn bar_percentage(&self) -> f64 {
        self.percentage.clamp(0.0, 100.0)
    }
}

/// Calculate how much of `goal` has been spent.
///
/// Only expense transactions in the goal's category (matched by category ID)
/// that fall in the goal's month and year count towards the total.
///
/// # Errors
/// Returns [Error::InvalidGoalAmount] if the goal's amount is zero or
/// negative, since the percentage would be a division by zero.
pub fn calculate_progress(
    goal: &BudgetGoal,
    transactions: &[CategorizedTransaction],
) -> Result<BudgetProgress, Error> {
    if goal.amount <= 0.0 {
        return Err(Error::InvalidGoalAmount(goal.amount));
    }

    let spent: f64 = transactions
        .iter()
        .filter(|transaction| {
            transaction.kind == TransactionKind::Expense
                && transaction
                    .category
                    .as_ref()
                    .is_some_and(|category| category.id == goal.category_id)
                && transaction.date.month() == goal.month
                && transaction.date.year() == goal.year
        })
        .map(|transaction| transaction.amount)
        .sum();

    let percentage = spent / goal.amount * 100.0;
    let remaining = (goal.amount - spent).max(0.0);

    Ok(BudgetProgress {
        spent,
        percentage,
        remaining,
        status: status_for(percentage),
    })
}

fn status_for(percentage: f64) -> BudgetStatus {
    if percentage <= 50.0 {
        BudgetStatus::OnTrack
    } else if percentage <= 80.0 {
        BudgetStatus::Warning
    } else if percentage <= 100.0 {
        BudgetStatus::Close
    } else {
        BudgetStatus::OverBudget
    }
}
