//! Namespace role gates.
//!
//! Each gate runs after `auth_middleware` and refuses any other role with
//! a 403 that points the caller back to their own dashboard.

use axum::{extract::Request, middleware::Next, response::Response, Extension};

use common::AppError;
use domain::UserRole;

use super::CurrentUser;

async fn gate(
    role: UserRole,
    current_user: &CurrentUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let actor = current_user.actor();
    if let Err(denied) = actor.require_role(role) {
        tracing::info!(
            user_id = %actor.id,
            role = %actor.role,
            required = %role,
            path = %request.uri().path(),
            "Access denied"
        );
        return Err(denied.into());
    }
    Ok(next.run(request).await)
}

pub async fn admin_only(
    Extension(current_user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate(UserRole::Admin, &current_user, request, next).await
}

pub async fn manager_only(
    Extension(current_user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate(UserRole::Manager, &current_user, request, next).await
}

pub async fn user_only(
    Extension(current_user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate(UserRole::User, &current_user, request, next).await
}
