//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::admin_handler::{
    CreateDepartmentRequest, CreateUserRequest, UpdateDepartmentRequest, UpdateUserRequest,
};
use crate::handlers::auth_handler::{LoginRequest, LoginResponse};
use crate::handlers::manager_handler::{AssignStaffRequest, DepartmentOverview, ReviewRequest};
use crate::handlers::user_handler::ReportRequest;
use domain::{
    ActiveFilter, DailyReport, Department, DepartmentStatus, ReportStatus, UserResponse, UserRole,
};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::auth_handler::login,
        crate::handlers::profile_handler::me,
        crate::handlers::admin_handler::dashboard,
        crate::handlers::admin_handler::list_departments,
        crate::handlers::admin_handler::create_department,
        crate::handlers::admin_handler::get_department,
        crate::handlers::admin_handler::update_department,
        crate::handlers::admin_handler::delete_department,
        crate::handlers::admin_handler::restore_department,
        crate::handlers::admin_handler::list_users,
        crate::handlers::admin_handler::create_user,
        crate::handlers::admin_handler::get_user,
        crate::handlers::admin_handler::update_user,
        crate::handlers::admin_handler::deactivate_user,
        crate::handlers::manager_handler::dashboard,
        crate::handlers::manager_handler::own_department,
        crate::handlers::manager_handler::available_staff,
        crate::handlers::manager_handler::assign_staff,
        crate::handlers::manager_handler::show_staff,
        crate::handlers::manager_handler::remove_staff,
        crate::handlers::manager_handler::list_reports,
        crate::handlers::manager_handler::export_reports,
        crate::handlers::manager_handler::get_report,
        crate::handlers::manager_handler::review_report,
        crate::handlers::user_handler::dashboard,
        crate::handlers::user_handler::list_reports,
        crate::handlers::user_handler::create_report,
        crate::handlers::user_handler::get_report,
        crate::handlers::user_handler::update_report,
        crate::handlers::user_handler::delete_report,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            UserResponse,
            UserRole,
            ActiveFilter,
            Department,
            DepartmentStatus,
            DailyReport,
            ReportStatus,
            CreateDepartmentRequest,
            UpdateDepartmentRequest,
            CreateUserRequest,
            UpdateUserRequest,
            AssignStaffRequest,
            DepartmentOverview,
            ReviewRequest,
            ReportRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and dependency checks"),
        (name = "Authentication", description = "Sign in"),
        (name = "Profile", description = "The signed in account"),
        (name = "Admin", description = "Departments and accounts"),
        (name = "Manager", description = "Department staff and report review"),
        (name = "Staff", description = "Daily report submission"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
