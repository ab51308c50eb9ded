//! Admin namespace: dashboard, departments and user accounts.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult};
use domain::{
    ActiveFilter, CreateDepartment, CreateUser, Department, DepartmentStatus,
    DepartmentStatusFilter, UpdateDepartment, UpdateUser, UserFilter, UserResponse, UserRole,
};
use report_service_lib::service::AdminDashboard;

use crate::extractors::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Department create request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    #[schema(example = "Sales")]
    pub name: String,
    #[validate(length(max = 500, message = "is too long (maximum is 500 characters)"))]
    pub description: Option<String>,
}

/// Department update request; `status` soft-deletes or restores
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDepartmentRequest {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "is too long (maximum is 500 characters)"))]
    pub description: Option<String>,
    pub status: Option<DepartmentStatus>,
}

/// Department listing filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DepartmentListQuery {
    /// `all` (default), `active` or `deleted`
    pub status: Option<String>,
}

/// User create request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email(message = "is invalid"))]
    #[schema(example = "staff@example.com")]
    pub email: String,
    /// Generated and mailed when omitted
    #[validate(length(min = 6, message = "is too short (minimum is 6 characters)"))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    #[schema(example = "Jane Doe")]
    pub name: String,
    pub role: UserRole,
    pub department_id: Option<Uuid>,
}

/// User update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "is invalid"))]
    pub email: Option<String>,
    pub role: Option<UserRole>,
    /// `null` removes the user from their department
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<Uuid>)]
    pub department_id: Option<Option<Uuid>>,
    pub active: Option<bool>,
}

/// Distinguish an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

/// User listing filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserListQuery {
    /// Case-insensitive name fragment
    pub name: Option<String>,
    /// Case-insensitive email fragment
    pub email: Option<String>,
    /// `all` (default), `active` or `inactive`
    pub active: Option<ActiveFilter>,
    pub department_id: Option<Uuid>,
}

/// Create admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/departments", get(list_departments).post(create_department))
        .route(
            "/departments/:id",
            get(get_department)
                .put(update_department)
                .delete(delete_department),
        )
        .route("/departments/:id/restore", post(restore_department))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(deactivate_user),
        )
}

/// Admin dashboard counters
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active departments, managers and users"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn dashboard(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<AdminDashboard>> {
    let dashboard = state
        .services
        .dashboards()
        .admin_dashboard(&current_user.actor())
        .await?;
    Ok(Json(dashboard))
}

/// List departments
#[utoipa::path(
    get,
    path = "/admin/departments",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(DepartmentListQuery),
    responses(
        (status = 200, description = "Departments", body = Vec<Department>),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_departments(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<DepartmentListQuery>,
) -> AppResult<Json<Vec<Department>>> {
    let status = DepartmentStatusFilter::parse(query.status.as_deref().unwrap_or_default())
        .ok_or_else(|| AppError::bad_request("Unknown department status filter"))?;

    let departments = state
        .services
        .departments()
        .list_departments(&current_user.actor(), status)
        .await?;
    Ok(Json(departments))
}

/// Create a department
#[utoipa::path(
    post,
    path = "/admin/departments",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_department(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateDepartmentRequest>,
) -> AppResult<(StatusCode, Json<Department>)> {
    let department = state
        .services
        .departments()
        .create_department(
            &current_user.actor(),
            CreateDepartment {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(department)))
}

/// Show a department, deleted ones included
#[utoipa::path(
    get,
    path = "/admin/departments/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department", body = Department),
        (status = 404, description = "Department not found")
    )
)]
pub async fn get_department(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Department>> {
    let department = state
        .services
        .departments()
        .get_department(&current_user.actor(), id)
        .await?;
    Ok(Json(department))
}

/// Update a department
#[utoipa::path(
    put,
    path = "/admin/departments/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Department ID")),
    request_body = UpdateDepartmentRequest,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department still has users"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_department(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateDepartmentRequest>,
) -> AppResult<Json<Department>> {
    let department = state
        .services
        .departments()
        .update_department(
            &current_user.actor(),
            id,
            UpdateDepartment {
                name: payload.name,
                description: payload.description,
                status: payload.status,
            },
        )
        .await?;
    Ok(Json(department))
}

/// Soft delete a department
#[utoipa::path(
    delete,
    path = "/admin/departments/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department still has users")
    )
)]
pub async fn delete_department(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .services
        .departments()
        .delete_department(&current_user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Restore a soft-deleted department
#[utoipa::path(
    post,
    path = "/admin/departments/{id}/restore",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department restored", body = Department),
        (status = 404, description = "Department not found")
    )
)]
pub async fn restore_department(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Department>> {
    let department = state
        .services
        .departments()
        .restore_department(&current_user.actor(), id)
        .await?;
    Ok(Json(department))
}

/// List manager and staff accounts
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(UserListQuery),
    responses(
        (status = 200, description = "Users", body = Vec<UserResponse>)
    )
)]
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let filter = UserFilter {
        name: query.name.filter(|n| !n.trim().is_empty()),
        email: query.email.filter(|e| !e.trim().is_empty()),
        active: query.active.unwrap_or_default(),
        department_id: query.department_id,
        ..Default::default()
    };

    let users = state
        .services
        .users()
        .list_users(&current_user.actor(), filter)
        .await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create an account
#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created and welcome email queued", body = UserResponse),
        (status = 422, description = "Validation error, taken email or second manager")
    )
)]
pub async fn create_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .services
        .users()
        .create_user(
            &current_user.actor(),
            CreateUser {
                email: payload.email,
                password: payload.password,
                name: payload.name,
                role: payload.role,
                department_id: payload.department_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Show an account
#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .services
        .users()
        .show_user(&current_user.actor(), id)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update an account
#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .services
        .users()
        .update_user(
            &current_user.actor(),
            id,
            UpdateUser {
                name: payload.name,
                email: payload.email,
                role: payload.role,
                department_id: payload.department_id,
                active: payload.active,
            },
        )
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Deactivate an account
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Cannot deactivate yourself")
    )
)]
pub async fn deactivate_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .services
        .users()
        .deactivate_user(&current_user.actor(), id)
        .await?;
    Ok(Json(UserResponse::from(user)))
}
