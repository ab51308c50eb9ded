//! Dashboard service - per-role landing page summaries.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use common::AppResult;
use domain::{
    Action, ActiveFilter, Actor, DailyReport, Department, DepartmentStatusFilter, MonthWindow,
    ReportFilter, ReportStatus, Resource, StatusCounts, Subject, UserFilter, UserRole,
};

use crate::repository::{DailyReportRepository, DepartmentRepository, UserRepository};

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub departments: u64,
    pub managers: u64,
    pub users: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManagerDashboard {
    pub department: Option<Department>,
    pub active_staff: u64,
    /// Pending reports addressed to the manager
    pub pending_reports: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDashboard {
    pub month: String,
    pub counts: StatusCounts,
    pub reports: Vec<DailyReport>,
}

#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn admin_dashboard(&self, actor: &Actor) -> AppResult<AdminDashboard>;
    async fn manager_dashboard(&self, actor: &Actor) -> AppResult<ManagerDashboard>;
    async fn user_dashboard(&self, actor: &Actor) -> AppResult<UserDashboard>;
}

pub struct DashboardManager {
    users: Arc<dyn UserRepository>,
    departments: Arc<dyn DepartmentRepository>,
    reports: Arc<dyn DailyReportRepository>,
}

impl DashboardManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        departments: Arc<dyn DepartmentRepository>,
        reports: Arc<dyn DailyReportRepository>,
    ) -> Self {
        Self {
            users,
            departments,
            reports,
        }
    }
}

#[async_trait]
impl DashboardService for DashboardManager {
    async fn admin_dashboard(&self, actor: &Actor) -> AppResult<AdminDashboard> {
        actor
            .ability()
            .authorize(Action::Read, &Subject::Class(Resource::AdminDashboard))?;

        let (departments, managers, users) = futures::try_join!(
            self.departments.count(DepartmentStatusFilter::Active),
            self.users.count(UserFilter {
                roles: vec![UserRole::Manager],
                ..Default::default()
            }),
            self.users.count(UserFilter {
                roles: vec![UserRole::User],
                ..Default::default()
            }),
        )?;

        Ok(AdminDashboard {
            departments,
            managers,
            users,
        })
    }

    async fn manager_dashboard(&self, actor: &Actor) -> AppResult<ManagerDashboard> {
        actor
            .ability()
            .authorize(Action::Read, &Subject::Class(Resource::ManagerDashboard))?;

        let pending = self.reports.count(ReportFilter {
            receiver_id: Some(actor.id),
            status: Some(ReportStatus::Pending),
            ..Default::default()
        });

        let Some(department_id) = actor.department_id else {
            return Ok(ManagerDashboard {
                department: None,
                active_staff: 0,
                pending_reports: pending.await?,
            });
        };

        let (department, active_staff, pending_reports) = futures::try_join!(
            self.departments.find_by_id(department_id),
            self.users.count(UserFilter {
                department_id: Some(department_id),
                active: ActiveFilter::Active,
                roles: vec![UserRole::User],
                ..Default::default()
            }),
            pending,
        )?;

        Ok(ManagerDashboard {
            department,
            active_staff,
            pending_reports,
        })
    }

    async fn user_dashboard(&self, actor: &Actor) -> AppResult<UserDashboard> {
        actor
            .ability()
            .authorize(Action::Read, &Subject::Class(Resource::UserDashboard))?;

        let window = MonthWindow::current(Utc::now().date_naive());
        let reports = self
            .reports
            .list(ReportFilter {
                owner_id: Some(actor.id),
                date_from: Some(window.start),
                date_to: Some(window.end),
                ..Default::default()
            })
            .await?;

        let counts = reports
            .iter()
            .fold(StatusCounts::default(), |mut counts, report| {
                counts.record(report.status);
                counts
            });

        Ok(UserDashboard {
            month: window.label(),
            counts,
            reports,
        })
    }
}
