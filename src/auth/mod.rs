//! Cookie based authentication: logging in and out, registration and the
//! middleware that guards protected routes.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod register;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{LogInData, get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_hx, require_admin};
pub use register::{RegisterForm, get_register_page, post_register_user};
