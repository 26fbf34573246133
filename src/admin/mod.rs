//! The admin panel: managing user accounts and auditing admin activity.

mod core;
mod endpoints;
mod pages;

pub use core::{AdminAction, create_admin_action_table, get_recent_admin_actions, log_admin_action};
pub use endpoints::{AdminApiState, delete_user_endpoint, post_user_role};
pub use pages::{AdminPageState, get_admin_page};
