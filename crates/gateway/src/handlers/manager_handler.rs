//! Manager namespace: own department, staff assignment and report review.

use axum::{
    extract::{Extension, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{ActiveFilter, DailyReport, Department, ReportFilter, ReportStatus, UserResponse};
use report_service_lib::service::{ManagerDashboard, OwnDepartment, OwnedReport};

use crate::extractors::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Manager's department with its members
#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentOverview {
    /// Absent when the manager has no department yet
    pub department: Option<Department>,
    pub active_staff: u64,
    pub members: Vec<UserResponse>,
}

impl From<OwnDepartment> for DepartmentOverview {
    fn from(own: OwnDepartment) -> Self {
        Self {
            department: own.department,
            active_staff: own.active_staff,
            members: own.members.iter().map(UserResponse::from).collect(),
        }
    }
}

/// Member listing filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct MembersQuery {
    /// `active` (default), `inactive` or `all`
    pub active: Option<ActiveFilter>,
}

/// Staff assignment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignStaffRequest {
    pub user_id: Uuid,
}

/// Department report filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportListQuery {
    pub owner_id: Option<Uuid>,
    /// Required by the CSV export
    pub report_date: Option<NaiveDate>,
    pub status: Option<ReportStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl From<ReportListQuery> for ReportFilter {
    fn from(query: ReportListQuery) -> Self {
        Self {
            owner_id: query.owner_id,
            report_date: query.report_date,
            status: query.status,
            date_from: query.date_from,
            date_to: query.date_to,
            ..Default::default()
        }
    }
}

/// Review request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewRequest {
    /// Blank notes mark the report read, anything else marks it commented
    #[validate(length(max = 2000, message = "is too long (maximum is 2000 characters)"))]
    pub manager_notes: Option<String>,
}

/// Create manager routes
pub fn manager_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/department", get(own_department))
        .route("/staff", post(assign_staff))
        .route("/staff/available", get(available_staff))
        .route("/staff/:id", get(show_staff).delete(remove_staff))
        .route("/daily_reports", get(list_reports))
        .route("/daily_reports/export", get(export_reports))
        .route("/daily_reports/:id", get(get_report))
        .route("/daily_reports/:id/review", put(review_report))
}

/// Department headcount and pending reviews
#[utoipa::path(
    get,
    path = "/manager/dashboard",
    tag = "Manager",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Department, active staff and pending reports"),
        (status = 403, description = "Not a manager")
    )
)]
pub async fn dashboard(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<ManagerDashboard>> {
    let dashboard = state
        .services
        .dashboards()
        .manager_dashboard(&current_user.actor())
        .await?;
    Ok(Json(dashboard))
}

/// Own department and its members
#[utoipa::path(
    get,
    path = "/manager/department",
    tag = "Manager",
    security(("bearer_auth" = [])),
    params(MembersQuery),
    responses(
        (status = 200, description = "Department overview", body = DepartmentOverview)
    )
)]
pub async fn own_department(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<MembersQuery>,
) -> AppResult<Json<DepartmentOverview>> {
    let own = state
        .services
        .departments()
        .own_department(
            &current_user.actor(),
            query.active.unwrap_or(ActiveFilter::Active),
        )
        .await?;
    Ok(Json(own.into()))
}

/// Active staff without a department
#[utoipa::path(
    get,
    path = "/manager/staff/available",
    tag = "Manager",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Assignable users", body = Vec<UserResponse>),
        (status = 409, description = "No users available to assign")
    )
)]
pub async fn available_staff(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state
        .services
        .users()
        .available_users(&current_user.actor())
        .await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// Move an unassigned user into the manager's department
#[utoipa::path(
    post,
    path = "/manager/staff",
    tag = "Manager",
    security(("bearer_auth" = [])),
    request_body = AssignStaffRequest,
    responses(
        (status = 200, description = "User assigned", body = UserResponse),
        (status = 409, description = "User already belongs to a department"),
        (status = 422, description = "Not an assignable user")
    )
)]
pub async fn assign_staff(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AssignStaffRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .services
        .users()
        .assign_to_department(&current_user.actor(), payload.user_id)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Show a member of the department
#[utoipa::path(
    get,
    path = "/manager/staff/{id}",
    tag = "Manager",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Outside the department")
    )
)]
pub async fn show_staff(
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

/// Remove a member from the department
#[utoipa::path(
    delete,
    path = "/manager/staff/{id}",
    tag = "Manager",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User removed from the department", body = UserResponse),
        (status = 403, description = "Outside the department"),
        (status = 409, description = "Cannot remove yourself")
    )
)]
pub async fn remove_staff(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .services
        .users()
        .remove_from_department(&current_user.actor(), id)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Reports of the department staff
#[utoipa::path(
    get,
    path = "/manager/daily_reports",
    tag = "Manager",
    security(("bearer_auth" = [])),
    params(ReportListQuery),
    responses(
        (status = 200, description = "Reports with their authors")
    )
)]
pub async fn list_reports(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<ReportListQuery>,
) -> AppResult<Json<Vec<OwnedReport>>> {
    let reports = state
        .services
        .reports()
        .list_department_reports(&current_user.actor(), query.into())
        .await?;
    Ok(Json(reports))
}

/// CSV export of one day of department reports
#[utoipa::path(
    get,
    path = "/manager/daily_reports/export",
    tag = "Manager",
    security(("bearer_auth" = [])),
    params(ReportListQuery),
    responses(
        (status = 200, description = "CSV attachment", body = String, content_type = "text/csv"),
        (status = 400, description = "No report date selected or nothing to export")
    )
)]
pub async fn export_reports(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<ReportListQuery>,
) -> AppResult<Response> {
    let filename = match query.report_date {
        Some(date) => format!("daily_reports_{}.csv", date.format("%Y-%m-%d")),
        None => "daily_reports.csv".to_string(),
    };

    let body = state
        .services
        .reports()
        .export_reports(&current_user.actor(), query.into())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}

/// Show a department report
#[utoipa::path(
    get,
    path = "/manager/daily_reports/{id}",
    tag = "Manager",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report", body = DailyReport),
        (status = 403, description = "Outside the department")
    )
)]
pub async fn get_report(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DailyReport>> {
    let report = state
        .services
        .reports()
        .get_report(&current_user.actor(), id)
        .await?;
    Ok(Json(report))
}

/// Save review notes
#[utoipa::path(
    put,
    path = "/manager/daily_reports/{id}/review",
    tag = "Manager",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Report reviewed", body = DailyReport),
        (status = 403, description = "Outside the department"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn review_report(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReviewRequest>,
) -> AppResult<Json<DailyReport>> {
    let report = state
        .services
        .reports()
        .review_report(&current_user.actor(), id, payload.manager_notes)
        .await?;
    Ok(Json(report))
}
