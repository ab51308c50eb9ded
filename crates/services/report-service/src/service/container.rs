//! Service Container - Centralized service access.
//!
//! Wires the SeaORM stores and the mailer into the application services
//! and hands them out behind their traits.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use common::JwtConfig;

use super::{
    AuthService, Authenticator, DailyReportManager, DailyReportService, DashboardManager,
    DashboardService, DepartmentManager, DepartmentService, StatisticsManager, StatisticsService,
    UserManager, UserService,
};
use crate::mail::Mailer;
use crate::repository::{
    DailyReportRepository, DailyReportStore, DepartmentRepository, DepartmentStore,
    UserRepository, UserStore,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;
    fn users(&self) -> Arc<dyn UserService>;
    fn departments(&self) -> Arc<dyn DepartmentService>;
    fn reports(&self) -> Arc<dyn DailyReportService>;
    fn dashboards(&self) -> Arc<dyn DashboardService>;
    fn statistics(&self) -> Arc<dyn StatisticsService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    department_service: Arc<dyn DepartmentService>,
    report_service: Arc<dyn DailyReportService>,
    dashboard_service: Arc<dyn DashboardService>,
    statistics_service: Arc<dyn StatisticsService>,
}

impl Services {
    /// Create a container from already built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        department_service: Arc<dyn DepartmentService>,
        report_service: Arc<dyn DailyReportService>,
        dashboard_service: Arc<dyn DashboardService>,
        statistics_service: Arc<dyn StatisticsService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            department_service,
            report_service,
            dashboard_service,
            statistics_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: DatabaseConnection, jwt: JwtConfig, mailer: Arc<dyn Mailer>) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(UserStore::new(db.clone()));
        let departments: Arc<dyn DepartmentRepository> = Arc::new(DepartmentStore::new(db.clone()));
        let reports: Arc<dyn DailyReportRepository> = Arc::new(DailyReportStore::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(users.clone(), jwt)),
            user_service: Arc::new(UserManager::new(
                users.clone(),
                departments.clone(),
                mailer.clone(),
            )),
            department_service: Arc::new(DepartmentManager::new(
                departments.clone(),
                users.clone(),
            )),
            report_service: Arc::new(DailyReportManager::new(
                reports.clone(),
                users.clone(),
                departments.clone(),
                mailer.clone(),
            )),
            dashboard_service: Arc::new(DashboardManager::new(
                users.clone(),
                departments.clone(),
                reports.clone(),
            )),
            statistics_service: Arc::new(StatisticsManager::new(
                users,
                departments,
                reports,
                mailer,
            )),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn departments(&self) -> Arc<dyn DepartmentService> {
        self.department_service.clone()
    }

    fn reports(&self) -> Arc<dyn DailyReportService> {
        self.report_service.clone()
    }

    fn dashboards(&self) -> Arc<dyn DashboardService> {
        self.dashboard_service.clone()
    }

    fn statistics(&self) -> Arc<dyn StatisticsService> {
        self.statistics_service.clone()
    }
}
