//! Staff namespace: dashboard and own daily reports.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{DailyReport, ReportContent, ReportFilter, ReportStatus};
use report_service_lib::service::UserDashboard;

use crate::extractors::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Daily report create and update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReportRequest {
    #[schema(example = "2024-06-03")]
    pub report_date: Option<NaiveDate>,
    #[validate(length(max = 2000, message = "is too long (maximum is 2000 characters)"))]
    pub planned_tasks: String,
    #[validate(length(max = 2000, message = "is too long (maximum is 2000 characters)"))]
    pub actual_tasks: String,
    #[validate(length(max = 2000, message = "is too long (maximum is 2000 characters)"))]
    pub incomplete_reason: Option<String>,
    #[validate(length(max = 2000, message = "is too long (maximum is 2000 characters)"))]
    pub next_day_planned_tasks: Option<String>,
}

impl From<ReportRequest> for ReportContent {
    fn from(request: ReportRequest) -> Self {
        Self {
            report_date: request.report_date,
            planned_tasks: request.planned_tasks,
            actual_tasks: request.actual_tasks,
            incomplete_reason: request.incomplete_reason,
            next_day_planned_tasks: request.next_day_planned_tasks,
        }
    }
}

/// Own report listing filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct OwnReportQuery {
    pub report_date: Option<NaiveDate>,
    pub status: Option<ReportStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl From<OwnReportQuery> for ReportFilter {
    fn from(query: OwnReportQuery) -> Self {
        Self {
            report_date: query.report_date,
            status: query.status,
            date_from: query.date_from,
            date_to: query.date_to,
            ..Default::default()
        }
    }
}

/// Create staff routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/daily_reports", get(list_reports).post(create_report))
        .route(
            "/daily_reports/:id",
            get(get_report).put(update_report).delete(delete_report),
        )
}

/// This month's report counts and the latest reports
#[utoipa::path(
    get,
    path = "/user/dashboard",
    tag = "Staff",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Monthly status counts and recent reports"),
        (status = 403, description = "Not a staff member")
    )
)]
pub async fn dashboard(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserDashboard>> {
    let dashboard = state
        .services
        .dashboards()
        .user_dashboard(&current_user.actor())
        .await?;
    Ok(Json(dashboard))
}

/// List own reports, newest first
#[utoipa::path(
    get,
    path = "/user/daily_reports",
    tag = "Staff",
    security(("bearer_auth" = [])),
    params(OwnReportQuery),
    responses(
        (status = 200, description = "Own reports", body = Vec<DailyReport>)
    )
)]
pub async fn list_reports(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<OwnReportQuery>,
) -> AppResult<Json<Vec<DailyReport>>> {
    let reports = state
        .services
        .reports()
        .list_own_reports(&current_user.actor(), query.into())
        .await?;
    Ok(Json(reports))
}

/// Submit a daily report to the department manager
#[utoipa::path(
    post,
    path = "/user/daily_reports",
    tag = "Staff",
    security(("bearer_auth" = [])),
    request_body = ReportRequest,
    responses(
        (status = 201, description = "Report submitted", body = DailyReport),
        (status = 409, description = "Not assigned to a department"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_report(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ReportRequest>,
) -> AppResult<(StatusCode, Json<DailyReport>)> {
    let report = state
        .services
        .reports()
        .create_report(&current_user.actor(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Show an own report
#[utoipa::path(
    get,
    path = "/user/daily_reports/{id}",
    tag = "Staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report", body = DailyReport),
        (status = 403, description = "Not the owner")
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

/// Edit a pending report
#[utoipa::path(
    put,
    path = "/user/daily_reports/{id}",
    tag = "Staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report updated", body = DailyReport),
        (status = 403, description = "Not the owner or already reviewed"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_report(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReportRequest>,
) -> AppResult<Json<DailyReport>> {
    let report = state
        .services
        .reports()
        .update_report(&current_user.actor(), id, payload.into())
        .await?;
    Ok(Json(report))
}

/// Delete a pending report
#[utoipa::path(
    delete,
    path = "/user/daily_reports/{id}",
    tag = "Staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 204, description = "Report deleted"),
        (status = 403, description = "Not the owner or already reviewed")
    )
)]
pub async fn delete_report(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .services
        .reports()
        .delete_report(&current_user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
