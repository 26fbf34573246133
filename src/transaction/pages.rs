//! Defines the route handler for the page that displays transactions as a table.

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
    AppState, Error,
    category::{Category, get_all_categories},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, CATEGORY_BADGE_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    report::UNCATEGORIZED_LABEL,
    timezone::get_local_offset,
    transaction::{
        TransactionKind,
        query::{CategorizedTransaction, get_categorized_transactions},
    },
    user::{Role, UserID, get_user_by_id},
};

/// The state needed for the transactions page.
#[derive(Clone)]
pub struct TransactionsPageState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render an overview of the user's transactions, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let user = get_user_by_id(user_id, &connection)?;
    let transactions = get_categorized_transactions(user_id, &connection)?;
    let categories = get_all_categories(&connection)?;
    drop(connection);

    let nav_bar = if user.role == Role::Admin {
        NavBar::new(endpoints::TRANSACTIONS_VIEW).with_admin_link(endpoints::TRANSACTIONS_VIEW)
    } else {
        NavBar::new(endpoints::TRANSACTIONS_VIEW)
    };

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl"
            {
                h1 class="text-2xl font-bold mb-4" { "Transactions" }

                (create_transaction_form(&categories, today))

                @if transactions.is_empty() {
                    p class="mt-6 text-gray-500 dark:text-gray-400"
                    {
                        "No transactions yet. Record your first one above."
                    }
                } @else {
                    (transaction_table(&transactions))
                }
            }
        }
    };

    Ok(base("Transactions", &[], &content).into_response())
}

fn current_local_date(local_timezone: &str) -> Result<Date, Error> {
    let Some(local_offset) = get_local_offset(local_timezone) else {
        tracing::error!("Invalid timezone {}", local_timezone);
        return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
    };

    Ok(OffsetDateTime::now_utc().to_offset(local_offset).date())
}

fn category_options(categories: &[Category], kind: TransactionKind) -> Markup {
    html! {
        @for category in categories {
            @if category.kind == kind {
                option value=(category.id)
                {
                    (category.icon) " " (category.name)
                }
            }
        }
    }
}

fn create_transaction_form(categories: &[Category], today: Date) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div class="grid grid-cols-2 gap-4"
                {
                    div
                    {
                        label for="kind" class=(FORM_LABEL_STYLE) { "Type" }
                        select name="kind" id="kind" class=(FORM_TEXT_INPUT_STYLE) required
                        {
                            option value="expense" { "Expense" }
                            option value="income" { "Income" }
                        }
                    }

                    div
                    {
                        label for="amount" class=(FORM_LABEL_STYLE) { "Amount ($)" }
                        input
                            type="number"
                            name="amount"
                            id="amount"
                            class=(FORM_TEXT_INPUT_STYLE)
                            min="0"
                            step="0.01"
                            placeholder="12.50"
                            required;
                    }
                }

                div class="grid grid-cols-2 gap-4"
                {
                    div
                    {
                        label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                        input
                            type="date"
                            name="date"
                            id="date"
                            class=(FORM_TEXT_INPUT_STYLE)
                            value=(today)
                            required;
                    }

                    div
                    {
                        label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }
                        select name="category_id" id="category_id" class=(FORM_TEXT_INPUT_STYLE)
                        {
                            option value="" { "No category" }
                            optgroup label="Expense"
                            {
                                (category_options(categories, TransactionKind::Expense))
                            }
                            optgroup label="Income"
                            {
                                (category_options(categories, TransactionKind::Income))
                            }
                        }
                    }
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description (optional)" }
                    input
                        type="text"
                        name="description"
                        id="description"
                        class=(FORM_TEXT_INPUT_STYLE)
                        placeholder="Lunch at the food court";
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
            }
        }
    }
}

fn amount_cell(transaction: &CategorizedTransaction) -> Markup {
    match transaction.kind {
        TransactionKind::Income => html! {
            span class="font-semibold text-green-600 dark:text-green-400"
            {
                "+" (format_currency(transaction.amount))
            }
        },
        TransactionKind::Expense => html! {
            span class="font-semibold text-red-600 dark:text-red-400"
            {
                "-" (format_currency(transaction.amount))
            }
        },
    }
}

fn category_badge(category: Option<&Category>) -> Markup {
    html! {
        @match category {
            Some(category) => {
                span class=(CATEGORY_BADGE_STYLE)
                {
                    (category.icon) " " (category.name)
                }
            }
            None => {
                span class="text-gray-500 dark:text-gray-400" { (UNCATEGORIZED_LABEL) }
            }
        }
    }
}

fn transaction_table(transactions: &[CategorizedTransaction]) -> Markup {
    html! {
        div class="mt-6 relative overflow-x-auto shadow-md sm:rounded-lg"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) {
                            span class="sr-only" { "Delete" }
                        }
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
                                (category_badge(transaction.category.as_ref()))
                            }
                            td class=(TABLE_CELL_STYLE)
                            {
                                @if let Some(description) = &transaction.description {
                                    (description)
                                }
                            }
                            td class=(TABLE_CELL_STYLE) { (amount_cell(transaction)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                button
                                    hx-delete=(format_endpoint(
                                        endpoints::TRANSACTION,
                                        transaction.id,
                                    ))
                                    hx-confirm="Delete this transaction?"
                                    hx-target-error="#alert-container"
                                    class=(BUTTON_DELETE_STYLE)
                                {
                                    "Delete"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
