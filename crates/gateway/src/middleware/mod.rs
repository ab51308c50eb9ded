//! Middleware for authentication and role gates.

mod auth;
mod role;

pub use auth::{auth_middleware, CurrentUser};
pub use role::{admin_only, manager_only, user_only};
