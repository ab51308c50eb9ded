//! Application services layer - Use cases and business logic.
//!
//! Every operation that acts on behalf of a signed in user takes the
//! `Actor` explicitly and checks the policy before touching data.

mod auth_service;
pub mod container;
mod daily_report_service;
mod dashboard_service;
mod department_service;
mod statistics_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use daily_report_service::{DailyReportManager, DailyReportService, OwnedReport};
pub use dashboard_service::{
    AdminDashboard, DashboardManager, DashboardService, ManagerDashboard, UserDashboard,
};
pub use department_service::{DepartmentManager, DepartmentService, OwnDepartment};
pub use statistics_service::{MonthlyStatsOutcome, StatisticsManager, StatisticsService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use statistics_service::MockStatisticsService;
