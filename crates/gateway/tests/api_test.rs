//! Integration tests for API endpoints.
//!
//! These tests drive the full router with hand-written mock services, so
//! authentication, role gates and error rendering run without a database.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{
    ActiveFilter, Actor, CreateDepartment, CreateUser, DailyReport, Department,
    DepartmentStatusFilter, ReportContent, ReportFilter, SoftDeleteOutcome, StatusCounts,
    UpdateDepartment, UpdateUser, User, UserFilter, UserRole,
};
use gateway_lib::config::GatewayConfig;
use gateway_lib::routes::create_router;
use gateway_lib::state::AppState;
use report_service_lib::export;
use report_service_lib::service::{
    AdminDashboard, AuthService, Claims, DailyReportService, DashboardService, DepartmentService,
    ManagerDashboard, MockStatisticsService, OwnDepartment, OwnedReport, Services, TokenResponse,
    UserDashboard, UserService,
};

// =============================================================================
// Fixtures
// =============================================================================

const ADMIN_ID: Uuid = Uuid::from_u128(1);
const MANAGER_ID: Uuid = Uuid::from_u128(2);
const STAFF_ID: Uuid = Uuid::from_u128(3);
const INACTIVE_ID: Uuid = Uuid::from_u128(4);
const DEPARTMENT_ID: Uuid = Uuid::from_u128(100);

fn fixture_user(id: Uuid) -> Option<User> {
    let (name, role, department_id, active) = match id {
        ADMIN_ID => ("Admin", UserRole::Admin, None, true),
        MANAGER_ID => ("Manager", UserRole::Manager, Some(DEPARTMENT_ID), true),
        STAFF_ID => ("Staff", UserRole::User, Some(DEPARTMENT_ID), true),
        INACTIVE_ID => ("Former", UserRole::User, Some(DEPARTMENT_ID), false),
        _ => return None,
    };

    let mut user = User::new(
        format!("{}@example.com", name.to_lowercase()),
        "hashed".to_string(),
        name.to_string(),
        role,
        department_id,
    );
    user.id = id;
    user.active = active;
    Some(user)
}

fn fixture_department() -> Department {
    let mut department = Department::new("Sales".to_string(), None);
    department.id = DEPARTMENT_ID;
    department.manager_id = Some(MANAGER_ID);
    department
}

// =============================================================================
// Mock Services for Testing
// =============================================================================

/// Maps fixed bearer tokens to the fixture users
struct MockAuthService;

#[async_trait]
impl AuthService for MockAuthService {
    async fn login(&self, email: String, _password: String) -> AppResult<TokenResponse> {
        let role = if email.starts_with("admin") {
            UserRole::Admin
        } else {
            UserRole::User
        };
        Ok(TokenResponse {
            access_token: "mock-token".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
            redirect_to: role.home_path().to_string(),
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let sub = match token {
            "admin-token" => ADMIN_ID,
            "manager-token" => MANAGER_ID,
            "user-token" => STAFF_ID,
            "inactive-token" => INACTIVE_ID,
            _ => return Err(AppError::Unauthorized),
        };
        Ok(Claims {
            sub,
            email: "test@example.com".to_string(),
            role: "user".to_string(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        })
    }
}

struct MockUserService;

#[async_trait]
impl UserService for MockUserService {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        fixture_user(id).ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    async fn list_users(&self, _actor: &Actor, _filter: UserFilter) -> AppResult<Vec<User>> {
        Ok([MANAGER_ID, STAFF_ID].into_iter().filter_map(fixture_user).collect())
    }

    async fn show_user(&self, _actor: &Actor, id: Uuid) -> AppResult<User> {
        self.get_user(id).await
    }

    async fn create_user(&self, _actor: &Actor, input: CreateUser) -> AppResult<User> {
        Ok(User::new(
            input.email,
            "hashed".to_string(),
            input.name,
            input.role,
            input.department_id,
        ))
    }

    async fn update_user(&self, _actor: &Actor, id: Uuid, input: UpdateUser) -> AppResult<User> {
        let mut user = self.get_user(id).await?;
        if let Some(name) = input.name {
            user.name = name;
        }
        if let Some(department_id) = input.department_id {
            user.department_id = department_id;
        }
        Ok(user)
    }

    async fn deactivate_user(&self, actor: &Actor, id: Uuid) -> AppResult<User> {
        if actor.id == id {
            return Err(AppError::dependency("You cannot deactivate your own account"));
        }
        let mut user = self.get_user(id).await?;
        user.deactivate();
        Ok(user)
    }

    async fn available_users(&self, _actor: &Actor) -> AppResult<Vec<User>> {
        Err(AppError::dependency("There are no users available to assign"))
    }

    async fn assign_to_department(&self, actor: &Actor, user_id: Uuid) -> AppResult<User> {
        let mut user = self.get_user(user_id).await?;
        user.department_id = actor.department_id;
        Ok(user)
    }

    async fn remove_from_department(&self, _actor: &Actor, user_id: Uuid) -> AppResult<User> {
        let mut user = self.get_user(user_id).await?;
        user.department_id = None;
        Ok(user)
    }
}

struct MockDepartmentService;

#[async_trait]
impl DepartmentService for MockDepartmentService {
    async fn list_departments(
        &self,
        _actor: &Actor,
        status: DepartmentStatusFilter,
    ) -> AppResult<Vec<Department>> {
        Ok(vec![fixture_department()]
            .into_iter()
            .filter(|d| status.matches(d))
            .collect())
    }

    async fn get_department(&self, _actor: &Actor, id: Uuid) -> AppResult<Department> {
        if id == DEPARTMENT_ID {
            Ok(fixture_department())
        } else {
            Err(AppError::NotFound("Department".to_string()))
        }
    }

    async fn create_department(
        &self,
        _actor: &Actor,
        input: CreateDepartment,
    ) -> AppResult<Department> {
        Ok(Department::new(input.name, input.description))
    }

    async fn update_department(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateDepartment,
    ) -> AppResult<Department> {
        let mut department = self.get_department(actor, id).await?;
        if let Some(name) = input.name {
            department.name = name;
        }
        Ok(department)
    }

    async fn delete_department(&self, _actor: &Actor, id: Uuid) -> AppResult<SoftDeleteOutcome> {
        if id == DEPARTMENT_ID {
            Err(AppError::dependency(
                "Cannot delete a department that still has users",
            ))
        } else {
            Ok(SoftDeleteOutcome::Deleted)
        }
    }

    async fn restore_department(&self, actor: &Actor, id: Uuid) -> AppResult<Department> {
        self.get_department(actor, id).await
    }

    async fn own_department(&self, _actor: &Actor, active: ActiveFilter) -> AppResult<OwnDepartment> {
        let members: Vec<User> = [STAFF_ID, INACTIVE_ID]
            .into_iter()
            .filter_map(fixture_user)
            .filter(|u| active.as_flag().map_or(true, |flag| u.active == flag))
            .collect();
        Ok(OwnDepartment {
            department: Some(fixture_department()),
            active_staff: 1,
            members,
        })
    }
}

struct MockReportService;

fn fixture_report() -> DailyReport {
    let content = ReportContent {
        report_date: NaiveDate::from_ymd_opt(2024, 6, 3),
        planned_tasks: "Plan".to_string(),
        actual_tasks: "Done".to_string(),
        incomplete_reason: None,
        next_day_planned_tasks: None,
    };
    DailyReport::submit(STAFF_ID, Some(MANAGER_ID), content).expect("valid fixture report")
}

#[async_trait]
impl DailyReportService for MockReportService {
    async fn create_report(&self, actor: &Actor, content: ReportContent) -> AppResult<DailyReport> {
        Ok(DailyReport::submit(actor.id, Some(MANAGER_ID), content)?)
    }

    async fn list_own_reports(
        &self,
        _actor: &Actor,
        _filter: ReportFilter,
    ) -> AppResult<Vec<DailyReport>> {
        Ok(vec![fixture_report()])
    }

    async fn get_report(&self, _actor: &Actor, _id: Uuid) -> AppResult<DailyReport> {
        Ok(fixture_report())
    }

    async fn update_report(
        &self,
        _actor: &Actor,
        _id: Uuid,
        content: ReportContent,
    ) -> AppResult<DailyReport> {
        let mut report = fixture_report();
        report.apply_content(content, Utc::now())?;
        Ok(report)
    }

    async fn delete_report(&self, _actor: &Actor, _id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn list_department_reports(
        &self,
        _actor: &Actor,
        _filter: ReportFilter,
    ) -> AppResult<Vec<OwnedReport>> {
        Ok(vec![OwnedReport {
            report: fixture_report(),
            owner_name: "Staff".to_string(),
            owner_email: "staff@example.com".to_string(),
        }])
    }

    async fn review_report(
        &self,
        _actor: &Actor,
        _id: Uuid,
        notes: Option<String>,
    ) -> AppResult<DailyReport> {
        let mut report = fixture_report();
        report.apply_review(notes.as_deref(), Utc::now())?;
        Ok(report)
    }

    async fn export_reports(&self, actor: &Actor, filter: ReportFilter) -> AppResult<Vec<u8>> {
        export::ensure_date_selected(&filter)?;
        let rows = self.list_department_reports(actor, filter).await?;
        export::reports_csv(&rows)
    }
}

struct MockDashboardService;

#[async_trait]
impl DashboardService for MockDashboardService {
    async fn admin_dashboard(&self, _actor: &Actor) -> AppResult<AdminDashboard> {
        Ok(AdminDashboard {
            departments: 1,
            managers: 1,
            users: 2,
        })
    }

    async fn manager_dashboard(&self, _actor: &Actor) -> AppResult<ManagerDashboard> {
        Ok(ManagerDashboard {
            department: Some(fixture_department()),
            active_staff: 1,
            pending_reports: 1,
        })
    }

    async fn user_dashboard(&self, _actor: &Actor) -> AppResult<UserDashboard> {
        Ok(UserDashboard {
            month: "June 2024".to_string(),
            counts: StatusCounts::default(),
            reports: vec![],
        })
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn test_app() -> Router {
    let services = Services::new(
        Arc::new(MockAuthService),
        Arc::new(MockUserService),
        Arc::new(MockDepartmentService),
        Arc::new(MockReportService),
        Arc::new(MockDashboardService),
        Arc::new(MockStatisticsService::new()),
    );
    create_router(AppState::new(Arc::new(services), GatewayConfig::default()))
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Public Endpoints
// =============================================================================

#[tokio::test]
async fn test_health_without_database() {
    let response = test_app().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["services"]["database"]["status"], "not_configured");
}

#[tokio::test]
async fn test_login_returns_role_home() {
    let response = test_app()
        .oneshot(send_json(
            "POST",
            "/auth/login",
            None,
            json!({"email": "admin@example.com", "password": "secret"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["redirect_to"], "/admin/dashboard");
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
async fn test_login_with_invalid_email_is_unprocessable() {
    let response = test_app()
        .oneshot(send_json(
            "POST",
            "/auth/login",
            None,
            json!({"email": "nope", "password": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["fields"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_me_requires_token() {
    let response = test_app().oneshot(get("/me", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let response = test_app()
        .oneshot(get("/me", Some("manager-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["role"], "manager");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_inactive_account_is_rejected() {
    let response = test_app()
        .oneshot(get("/me", Some("inactive-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INACTIVE_ACCOUNT");
}

// =============================================================================
// Role Gates
// =============================================================================

#[tokio::test]
async fn test_user_denied_manager_namespace_with_redirect() {
    let response = test_app()
        .oneshot(get("/manager/daily_reports", Some("user-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    assert_eq!(body["error"]["redirect_to"], "/user/dashboard");
}

#[tokio::test]
async fn test_manager_denied_admin_namespace() {
    let response = test_app()
        .oneshot(get("/admin/users", Some("manager-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"]["redirect_to"], "/manager/dashboard");
}

#[tokio::test]
async fn test_admin_dashboard() {
    let response = test_app()
        .oneshot(get("/admin/dashboard", Some("admin-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["departments"], 1);
    assert_eq!(body["users"], 2);
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_create_department_with_blank_name() {
    let response = test_app()
        .oneshot(send_json(
            "POST",
            "/admin/departments",
            Some("admin-token"),
            json!({"name": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"]["fields"][0]["field"], "name");
}

#[tokio::test]
async fn test_unknown_department_status_filter() {
    let response = test_app()
        .oneshot(get("/admin/departments?status=archived", Some("admin-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_department_with_members_conflicts() {
    let uri = format!("/admin/departments/{}", DEPARTMENT_ID);
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, "Bearer admin-token")
        .body(Body::empty())
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "DEPENDENCY_ERROR");
}

#[tokio::test]
async fn test_update_user_null_department_clears_assignment() {
    let response = test_app()
        .oneshot(send_json(
            "PUT",
            &format!("/admin/users/{}", STAFF_ID),
            Some("admin-token"),
            json!({"department_id": null}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["department_id"].is_null());
}

#[tokio::test]
async fn test_update_user_without_department_keeps_assignment() {
    let response = test_app()
        .oneshot(send_json(
            "PUT",
            &format!("/admin/users/{}", STAFF_ID),
            Some("admin-token"),
            json!({"name": "Renamed"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["department_id"], DEPARTMENT_ID.to_string());
}

// =============================================================================
// Manager
// =============================================================================

#[tokio::test]
async fn test_export_without_date_is_bad_request() {
    let response = test_app()
        .oneshot(get("/manager/daily_reports/export", Some("manager-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], export::NO_DATE_SELECTED);
}

#[tokio::test]
async fn test_export_returns_csv_attachment() {
    let response = test_app()
        .oneshot(get(
            "/manager/daily_reports/export?report_date=2024-06-03",
            Some("manager-token"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"daily_reports_2024-06-03.csv\""
    );
}

#[tokio::test]
async fn test_own_department_lists_active_members_by_default() {
    let response = test_app()
        .oneshot(get("/manager/department", Some("manager-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["members"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_review_with_notes_marks_commented() {
    let response = test_app()
        .oneshot(send_json(
            "PUT",
            &format!("/manager/daily_reports/{}/review", Uuid::new_v4()),
            Some("manager-token"),
            json!({"manager_notes": "Good work"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "commented");
}

// =============================================================================
// Staff
// =============================================================================

#[tokio::test]
async fn test_user_creates_report() {
    let response = test_app()
        .oneshot(send_json(
            "POST",
            "/user/daily_reports",
            Some("user-token"),
            json!({
                "report_date": "2024-06-03",
                "planned_tasks": "Write the quarterly summary",
                "actual_tasks": "Drafted two sections"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["owner_id"], STAFF_ID.to_string());
}

#[tokio::test]
async fn test_report_without_date_is_unprocessable() {
    let response = test_app()
        .oneshot(send_json(
            "POST",
            "/user/daily_reports",
            Some("user-token"),
            json!({"planned_tasks": "Plan", "actual_tasks": "Done"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
