//! HTTP request handlers, one module per namespace.

pub mod admin_handler;
pub mod auth_handler;
pub mod health_handler;
pub mod manager_handler;
pub mod profile_handler;
pub mod user_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::auth_routes;
pub use health_handler::health_routes;
pub use manager_handler::manager_routes;
pub use profile_handler::profile_routes;
pub use user_handler::user_routes;
