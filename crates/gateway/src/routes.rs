//! Route configuration.

use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    admin_routes, auth_routes, health_routes, manager_routes, profile_routes, user_routes,
};
use crate::middleware::{admin_only, auth_middleware, manager_only, user_only};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Create the main router with all routes.
///
/// Route layers run bottom-up, so `auth_middleware` is added last and
/// attaches the `CurrentUser` before the role gate reads it.
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.clone();
    let authenticated = move |router: Router<AppState>| {
        router.route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
    };

    Router::new()
        // Health check (no auth)
        .nest("/health", health_routes())
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Sign in (no auth)
        .nest("/auth", auth_routes())
        // Any signed in role
        .nest("/me", authenticated(profile_routes()))
        .nest(
            "/admin",
            authenticated(admin_routes().route_layer(middleware::from_fn(admin_only))),
        )
        .nest(
            "/manager",
            authenticated(manager_routes().route_layer(middleware::from_fn(manager_only))),
        )
        .nest(
            "/user",
            authenticated(user_routes().route_layer(middleware::from_fn(user_only))),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
