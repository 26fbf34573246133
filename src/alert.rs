//! Alert fragments for displaying success and error messages to users.
//!
//! Endpoints return these fragments with an error status code so that the
//! htmx response-targets extension swaps them into the `#alert-container`
//! element of the current page.

use maud::{Markup, PreEscaped, html};

/// Renders alert messages with appropriate styling.
pub struct AlertTemplate;

impl AlertTemplate {
    /// Create a new success alert.
    pub fn success(message: &str, details: &str) -> Markup {
        alert(
            "text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400",
            message,
            details,
        )
    }

    /// Create a new error alert.
    pub fn error(message: &str, details: &str) -> Markup {
        alert(
            "text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400",
            message,
            details,
        )
    }
}

fn alert(color_style: &str, message: &str, details: &str) -> Markup {
    html! {
        div
            role="alert"
            class={ "flex items-start gap-3 p-4 mb-2 rounded-lg shadow " (color_style) }
        {
            div class="flex-1"
            {
                p class="font-medium" { (message) }

                @if !details.is_empty()
                {
                    p class="text-sm" { (details) }
                }
            }

            button
                type="button"
                class="font-bold cursor-pointer"
                onclick="this.closest('[role=alert]').remove(); \
                    document.getElementById('alert-container').classList.add('hidden');"
                aria-label="Dismiss"
            {
                "✕"
            }
        }

        // The container starts out hidden, reveal it once an alert arrives.
        script
        {
            (PreEscaped("document.getElementById('alert-container').classList.remove('hidden');"))
        }
    }
}

#[cfg(test)]
mod alert_tests {
    use super::AlertTemplate;

    #[test]
    fn error_alert_contains_message_and_details() {
        let markup = AlertTemplate::error("Could not log in", "Check for typos.").into_string();

        assert!(markup.contains("Could not log in"));
        assert!(markup.contains("Check for typos."));
        assert!(markup.contains("role=\"alert\""));
    }

    #[test]
    fn empty_details_are_omitted() {
        let markup = AlertTemplate::success("Saved", "").into_string();

        assert!(markup.contains("Saved"));
        assert!(!markup.contains("text-sm"));
    }
}
