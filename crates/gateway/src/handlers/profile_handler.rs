//! Profile of the signed in user, shared by every role.

use axum::{extract::Extension, response::Json, routing::get, Router};

use domain::UserResponse;

use crate::middleware::CurrentUser;
use crate::state::AppState;

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/", get(me))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/me",
    tag = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn me(Extension(current_user): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from(current_user.user()))
}
