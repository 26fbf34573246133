//! The dashboard page: a monthly overview of income, expenses and savings
//! plus the user's most recent transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    html::{
        CARD_STYLE, CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    report::UNCATEGORIZED_LABEL,
    timezone::get_local_offset,
    transaction::{CategorizedTransaction, TransactionKind, get_categorized_transactions},
    user::{Role, UserID, get_user_by_id},
};

/// How many transactions the recent activity table shows.
const RECENT_TRANSACTION_LIMIT: usize = 5;

/// The state needed for displaying the dashboard page.
#[derive(Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The income and expense totals for the current calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MonthSummary {
    income: f64,
    expenses: f64,
}

impl MonthSummary {
    fn savings(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Sum this month's income and expenses from the full transaction list.
fn summarize_current_month(transactions: &[CategorizedTransaction], today: Date) -> MonthSummary {
    let mut summary = MonthSummary {
        income: 0.0,
        expenses: 0.0,
    };

    for transaction in transactions {
        if transaction.date.year() != today.year() || transaction.date.month() != today.month() {
            continue;
        }

        match transaction.kind {
            TransactionKind::Income => summary.income += transaction.amount,
            TransactionKind::Expense => summary.expenses += transaction.amount,
        }
    }

    summary
}

/// Display a page with an overview of the user's data.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Err(Error::InvalidTimezoneError(state.local_timezone.clone()));
    };
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let user = get_user_by_id(user_id, &connection)?;
    let transactions = get_categorized_transactions(user_id, &connection)?;
    drop(connection);

    let nav_bar = if user.role == Role::Admin {
        NavBar::new(endpoints::DASHBOARD_VIEW).with_admin_link(endpoints::DASHBOARD_VIEW)
    } else {
        NavBar::new(endpoints::DASHBOARD_VIEW)
    };

    if transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let summary = summarize_current_month(&transactions, today);
    // Transactions come back newest first, so the recent list is a prefix.
    let recent = &transactions[..transactions.len().min(RECENT_TRANSACTION_LIMIT)];

    Ok(dashboard_view(nav_bar, summary, recent).into_response())
}

/// Renders the dashboard page when no transaction data exists.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let transactions_link = link(endpoints::TRANSACTIONS_VIEW, "adding a transaction");

    let content = html!(
        (nav_bar.into_html())

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your monthly overview will show up here once there is some data.
                Start by " (transactions_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn dashboard_view(
    nav_bar: NavBar,
    summary: MonthSummary,
    recent: &[CategorizedTransaction],
) -> Markup {
    let content = html!(
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl"
            {
                h1 class="text-2xl font-bold mb-4" { "Dashboard" }

                div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
                {
                    (stat_card(
                        "Income this month",
                        summary.income,
                        "text-green-600 dark:text-green-400",
                    ))
                    (stat_card(
                        "Expenses this month",
                        summary.expenses,
                        "text-red-600 dark:text-red-400",
                    ))
                    (stat_card(
                        "Savings this month",
                        summary.savings(),
                        if summary.savings() < 0.0 {
                            "text-red-600 dark:text-red-400"
                        } else {
                            "text-gray-900 dark:text-white"
                        },
                    ))
                }

                h2 class="text-xl font-semibold mt-8 mb-4" { "Recent Transactions" }
                (recent_transactions_table(recent))
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn stat_card(title: &str, amount: f64, amount_style: &str) -> Markup {
    html!(
        div class=(CARD_STYLE)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            p class=(format!("text-2xl font-bold {amount_style}"))
            {
                (format_currency(amount))
            }
        }
    )
}

fn recent_transactions_table(transactions: &[CategorizedTransaction]) -> Markup {
    html!(
        div class="w-full overflow-x-auto"
        {
            table class="w-full text-left"
            {
                thead
                {
                    tr
                    {
                        th class=(TABLE_HEADER_STYLE) { "Date" }
                        th class=(TABLE_HEADER_STYLE) { "Category" }
                        th class=(TABLE_HEADER_STYLE) { "Amount" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (transaction.date) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                @if let Some(category) = &transaction.category {
                                    span class=(CATEGORY_BADGE_STYLE)
                                    {
                                        (category.icon) " " (category.name)
                                    }
                                } @else {
                                    span class="text-gray-500 dark:text-gray-400"
                                    {
                                        (UNCATEGORIZED_LABEL)
                                    }
                                }
                            }
                            td class=(TABLE_CELL_STYLE)
                            {
                                @match transaction.kind {
                                    TransactionKind::Income => {
                                        span class="text-green-600 dark:text-green-400"
                                        {
                                            "+" (format_currency(transaction.amount))
                                        }
                                    }
                                    TransactionKind::Expense => {
                                        span class="text-red-600 dark:text-red-400"
                                        {
                                            "-" (format_currency(transaction.amount))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}
