//! The analytics page: an expense pie chart for the current month, a monthly
//! income/expense trend chart and category breakdown tables.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Color, ItemStyle, JsFunction, Tooltip,
        Trigger,
    },
    series::{Line, Pie},
};
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    html::{
        CARD_STYLE, HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    report::{
        CategorySummary, aggregate_by_month, format_month_label, percentage_of_section,
        summarize_by_category, top_expense_categories,
    },
    timezone::get_local_offset,
    transaction::{CategorizedTransaction, TransactionKind, get_categorized_transactions},
    user::{Role, UserID, get_user_by_id},
};

/// The state needed for displaying the analytics page.
#[derive(Clone)]
pub struct AnalyticsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AnalyticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A chart with its HTML container ID and ECharts configuration.
struct AnalyticsChart {
    /// The HTML element ID to use for the chart (kebab-case)
    id: &'static str,
    /// The ECharts configuration as a JSON string
    options: String,
}

/// Display a page with charts and breakdown tables over the user's
/// transactions.
pub async fn get_analytics_page(
    State(state): State<AnalyticsState>,
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
        NavBar::new(endpoints::ANALYTICS_VIEW).with_admin_link(endpoints::ANALYTICS_VIEW)
    } else {
        NavBar::new(endpoints::ANALYTICS_VIEW)
    };

    if transactions.is_empty() {
        return Ok(analytics_no_data_view(nav_bar).into_response());
    }

    let charts = [
        AnalyticsChart {
            id: "expense-pie-chart",
            options: expense_pie_chart(&transactions, today).to_string(),
        },
        AnalyticsChart {
            id: "monthly-trend-chart",
            options: monthly_trend_chart(&transactions).to_string(),
        },
    ];

    let expense_summaries = summarize_by_category(&transactions, TransactionKind::Expense);
    let income_summaries = summarize_by_category(&transactions, TransactionKind::Income);

    Ok(analytics_view(nav_bar, &charts, &expense_summaries, &income_summaries).into_response())
}

/// The pie chart of this month's expenses, largest categories only.
fn expense_pie_chart(transactions: &[CategorizedTransaction], today: Date) -> Chart {
    let slices = top_expense_categories(transactions, today.year(), today.month());

    let colors: Vec<Color> = slices
        .iter()
        .map(|slice| Color::from(slice.color.as_str()))
        .collect();
    let data: Vec<(f64, String)> = slices
        .into_iter()
        .map(|slice| (slice.total, format!("{} {}", slice.icon, slice.name)))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Expenses by Category")
                .subtext(format_month_label(today)),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().bottom("0%"))
        .series(
            Pie::new()
                .name("Expenses")
                .radius("55%")
                .item_style(ItemStyle::new().border_radius(4))
                .data(data),
        )
        .color(colors)
}

/// The line chart of monthly income, expenses and savings.
fn monthly_trend_chart(transactions: &[CategorizedTransaction]) -> Chart {
    let buckets = aggregate_by_month(transactions);

    let labels: Vec<String> = buckets.iter().map(|bucket| bucket.label()).collect();
    let income: Vec<f64> = buckets.iter().map(|bucket| bucket.income).collect();
    let expenses: Vec<f64> = buckets.iter().map(|bucket| bucket.expenses).collect();
    let savings: Vec<f64> = buckets.iter().map(|bucket| bucket.savings()).collect();

    Chart::new()
        .title(Title::new().text("Monthly Trend"))
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("5%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Income").data(income))
        .series(Line::new().name("Expenses").data(expenses))
        .series(Line::new().name("Savings").data(savings))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

/// Generates JavaScript initialization code for the analytics charts.
fn charts_script(charts: &[AnalyticsChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Renders the analytics page when no transaction data exists.
fn analytics_no_data_view(nav_bar: NavBar) -> Markup {
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
                "Charts will show up here once you add some transactions.
                Start by " (transactions_link) "."
            }
        }
    );

    base("Analytics", &[], &content)
}

fn analytics_view(
    nav_bar: NavBar,
    charts: &[AnalyticsChart],
    expense_summaries: &[CategorySummary],
    income_summaries: &[CategorySummary],
) -> Markup {
    let content = html!(
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                h1 class="text-2xl font-bold mb-4" { "Analytics" }

                section class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    @for chart in charts {
                        div
                            id=(chart.id)
                            class="min-h-[380px] rounded dark:bg-gray-100"
                        {}
                    }
                }

                section class="grid grid-cols-1 xl:grid-cols-2 gap-4 mt-8"
                {
                    (breakdown_table("Expenses by Category", expense_summaries))
                    (breakdown_table("Income by Category", income_summaries))
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Analytics", &scripts, &content)
}

fn breakdown_table(title: &str, summaries: &[CategorySummary]) -> Markup {
    let section_total: f64 = summaries.iter().map(|summary| summary.total).sum();

    html!(
        div class=(CARD_STYLE)
        {
            h2 class="text-xl font-semibold mb-4" { (title) }

            @if summaries.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No transactions." }
            } @else {
                table class="w-full text-left"
                {
                    thead
                    {
                        tr
                        {
                            th class=(TABLE_HEADER_STYLE) { "Category" }
                            th class=(TABLE_HEADER_STYLE) { "Total" }
                            th class=(TABLE_HEADER_STYLE) { "Share" }
                            th class=(TABLE_HEADER_STYLE) { "Count" }
                        }
                    }

                    tbody
                    {
                        @for summary in summaries {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    (summary.icon) " " (summary.name)
                                }
                                td class=(TABLE_CELL_STYLE) { (format_currency(summary.total)) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    (format!(
                                        "{:.1}%",
                                        percentage_of_section(summary.total, section_total)
                                    ))
                                }
                                td class=(TABLE_CELL_STYLE) { (summary.count) }
                            }
                        }
                    }
                }
            }
        }
    )
}
