//! Monthly budget goals: setting spending limits per category and tracking
//! progress against them.

mod core;
mod endpoints;
mod pages;

pub use core::{BudgetGoal, create_goal, create_goal_table, delete_goal, get_goals_for_user};
pub use endpoints::{create_goal_endpoint, delete_goal_endpoint};
pub use pages::{GoalsPageState, get_goals_page};
