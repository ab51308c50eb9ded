//! Authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use common::{AppError, AppResult};
use domain::{Actor, User};

use crate::state::AppState;

/// The signed in user, loaded fresh from the database on every request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }

    pub fn user(&self) -> &User {
        &self.0
    }
}

/// Validate the bearer token and attach the `CurrentUser`.
///
/// The role and department come from the stored user, not from the token
/// claims, so reassignments and deactivation take effect immediately.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::Unauthorized)?;
    let claims = state.services.auth().verify_token(bearer.token())?;

    let user = load_user(&state, claims.sub).await?;
    user.ensure_active()?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

async fn load_user(state: &AppState, id: uuid::Uuid) -> AppResult<User> {
    match state.services.users().get_user(id).await {
        Ok(user) => Ok(user),
        Err(AppError::NotFound(_)) => Err(AppError::Unauthorized),
        Err(e) => Err(e),
    }
}
