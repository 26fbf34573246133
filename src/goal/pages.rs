//! Defines the route handler for the page that displays budget goals and their
//! progress.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, Month, OffsetDateTime};

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    endpoints::{self, format_endpoint},
    goal::core::{BudgetGoal, get_goals_for_user},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, CATEGORY_BADGE_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, format_currency,
    },
    navigation::NavBar,
    report::{BudgetProgress, BudgetStatus, calculate_progress, format_month_label},
    timezone::get_local_offset,
    transaction::{TransactionKind, get_categorized_transactions},
    user::{Role, UserID, get_user_by_id},
};

/// The state needed for the budget goals page.
#[derive(Clone)]
pub struct GoalsPageState {
    /// The database connection for reading goals and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for GoalsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render an overview of the user's budget goals with their progress for the
/// month each goal applies to.
pub async fn get_goals_page(
    State(state): State<GoalsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let user = get_user_by_id(user_id, &connection)?;
    let goals = get_goals_for_user(user_id, &connection)?;
    let transactions = get_categorized_transactions(user_id, &connection)?;
    let categories = get_all_categories(&connection)?;
    drop(connection);

    let mut cards = Vec::with_capacity(goals.len());
    for goal in &goals {
        let progress = calculate_progress(goal, &transactions)?;
        let category = categories
            .iter()
            .find(|category| category.id == goal.category_id);
        cards.push(goal_card(goal, &progress, category));
    }

    let nav_bar = if user.role == Role::Admin {
        NavBar::new(endpoints::GOALS_VIEW).with_admin_link(endpoints::GOALS_VIEW)
    } else {
        NavBar::new(endpoints::GOALS_VIEW)
    };

    let expense_categories: Vec<&Category> = categories
        .iter()
        .filter(|category| category.kind == TransactionKind::Expense)
        .collect();

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl"
            {
                h1 class="text-2xl font-bold mb-4" { "Budget Goals" }

                (create_goal_form(&expense_categories, today))

                @if cards.is_empty() {
                    p class="mt-6 text-gray-500 dark:text-gray-400"
                    {
                        "No budget goals yet. Set a monthly limit for a category above."
                    }
                } @else {
                    div class="mt-6 grid gap-4 sm:grid-cols-2"
                    {
                        @for card in &cards { (card) }
                    }
                }
            }
        }
    };

    Ok(base("Budget Goals", &[], &content).into_response())
}

fn current_local_date(local_timezone: &str) -> Result<Date, Error> {
    let Some(local_offset) = get_local_offset(local_timezone) else {
        tracing::error!("Invalid timezone {}", local_timezone);
        return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
    };

    Ok(OffsetDateTime::now_utc().to_offset(local_offset).date())
}

const MONTH_OPTIONS: [(u8, &str); 12] = [
    (1, "January"),
    (2, "February"),
    (3, "March"),
    (4, "April"),
    (5, "May"),
    (6, "June"),
    (7, "July"),
    (8, "August"),
    (9, "September"),
    (10, "October"),
    (11, "November"),
    (12, "December"),
];

fn create_goal_form(expense_categories: &[&Category], today: Date) -> Markup {
    let current_month = today.month() as u8;

    html! {
        div class=(CARD_STYLE)
        {
            form
                hx-post=(endpoints::GOALS_API)
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div
                {
                    label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }
                    select
                        name="category_id"
                        id="category_id"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required
                    {
                        @for category in expense_categories {
                            option value=(category.id)
                            {
                                (category.icon) " " (category.name)
                            }
                        }
                    }
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Monthly Limit ($)" }
                    input
                        type="number"
                        name="amount"
                        id="amount"
                        class=(FORM_TEXT_INPUT_STYLE)
                        min="0.01"
                        step="0.01"
                        placeholder="500.00"
                        required;
                }

                div class="grid grid-cols-2 gap-4"
                {
                    div
                    {
                        label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                        select name="month" id="month" class=(FORM_TEXT_INPUT_STYLE) required
                        {
                            @for (number, name) in MONTH_OPTIONS {
                                option value=(number) selected[number == current_month]
                                {
                                    (name)
                                }
                            }
                        }
                    }

                    div
                    {
                        label for="year" class=(FORM_LABEL_STYLE) { "Year" }
                        input
                            type="number"
                            name="year"
                            id="year"
                            class=(FORM_TEXT_INPUT_STYLE)
                            value=(today.year())
                            required;
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Goal" }
            }
        }
    }
}

fn month_label(month: Month, year: i32) -> String {
    Date::from_calendar_date(year, month, 1)
        .map(format_month_label)
        .unwrap_or_else(|_| format!("{month:?} {year}"))
}

fn status_bar_class(status: BudgetStatus) -> &'static str {
    match status {
        BudgetStatus::OnTrack => "bg-green-500",
        BudgetStatus::Warning => "bg-yellow-400",
        BudgetStatus::Close => "bg-orange-500",
        BudgetStatus::OverBudget => "bg-red-500",
    }
}

fn goal_card(goal: &BudgetGoal, progress: &BudgetProgress, category: Option<&Category>) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            div class="flex items-start justify-between"
            {
                div
                {
                    @if let Some(category) = category {
                        span class=(CATEGORY_BADGE_STYLE)
                        {
                            (category.icon) " " (category.name)
                        }
                    }

                    p class="mt-2 text-sm text-gray-500 dark:text-gray-400"
                    {
                        (month_label(goal.month, goal.year))
                    }
                }

                button
                    hx-delete=(format_endpoint(endpoints::GOAL, goal.id))
                    hx-confirm="Delete this budget goal?"
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }

            div class="mt-4"
            {
                div class="flex justify-between text-sm"
                {
                    span
                    {
                        (format_currency(progress.spent))
                        " of "
                        (format_currency(goal.amount))
                    }
                    span { (progress.status.label()) }
                }

                div class="w-full h-2.5 mt-1 bg-gray-200 rounded-full dark:bg-gray-700"
                {
                    div
                        class=(format!("h-2.5 rounded-full {}", status_bar_class(progress.status)))
                        style=(format!("width: {:.0}%", progress.bar_percentage()))
                    {}
                }

                p class="mt-1 text-sm text-gray-500 dark:text-gray-400"
                {
                    (format_currency(progress.remaining)) " remaining"
                }
            }
        }
    }
}
