//! Statistics service - monthly per-staff report counts for a department.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use common::AppResult;
use domain::{
    generate_stats, DepartmentStats, MonthWindow, ReportFilter, ReportSummary, StaffMember,
    UserFilter, UserRole,
};

use crate::mail::Mailer;
use crate::repository::{DailyReportRepository, DepartmentRepository, UserRepository};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// What happened to one department's monthly statistics mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyStatsOutcome {
    Sent,
    SkippedNoManager,
    SkippedMissingDepartment,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StatisticsService: Send + Sync {
    /// Counts for every non-manager member of the department within `window`
    async fn generate_stats(&self, department_id: Uuid, window: MonthWindow)
        -> AppResult<DepartmentStats>;

    /// Mail the previous month's statistics to the department manager
    async fn send_monthly_stats(
        &self,
        department_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<MonthlyStatsOutcome>;
}

pub struct StatisticsManager {
    users: Arc<dyn UserRepository>,
    departments: Arc<dyn DepartmentRepository>,
    reports: Arc<dyn DailyReportRepository>,
    mailer: Arc<dyn Mailer>,
}

impl StatisticsManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        departments: Arc<dyn DepartmentRepository>,
        reports: Arc<dyn DailyReportRepository>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            users,
            departments,
            reports,
            mailer,
        }
    }
}

#[async_trait]
impl StatisticsService for StatisticsManager {
    async fn generate_stats(
        &self,
        department_id: Uuid,
        window: MonthWindow,
    ) -> AppResult<DepartmentStats> {
        let staff: Vec<StaffMember> = self
            .users
            .list(UserFilter {
                department_id: Some(department_id),
                roles: vec![UserRole::User],
                ..Default::default()
            })
            .await?
            .into_iter()
            .map(|user| StaffMember {
                id: user.id,
                name: user.name,
                email: user.email,
            })
            .collect();

        let reports: Vec<ReportSummary> = if staff.is_empty() {
            Vec::new()
        } else {
            self.reports
                .list(ReportFilter {
                    owner_ids: Some(staff.iter().map(|m| m.id).collect()),
                    date_from: Some(window.start),
                    date_to: Some(window.end),
                    ..Default::default()
                })
                .await?
                .into_iter()
                .map(|report| ReportSummary {
                    owner_id: report.owner_id,
                    report_date: report.report_date,
                    status: report.status,
                })
                .collect()
        };

        Ok(generate_stats(&staff, &reports, window))
    }

    async fn send_monthly_stats(
        &self,
        department_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<MonthlyStatsOutcome> {
        let department = match self.departments.find_by_id(department_id).await? {
            Some(department) if !department.is_deleted() => department,
            _ => {
                tracing::warn!(%department_id, "Monthly stats skipped: department missing");
                return Ok(MonthlyStatsOutcome::SkippedMissingDepartment);
            }
        };

        let manager = match department.manager_id {
            Some(manager_id) => self.users.find_by_id(manager_id).await?,
            None => None,
        };
        let Some(manager) = manager.filter(|m| m.active) else {
            tracing::info!(%department_id, "Monthly stats skipped: no manager");
            return Ok(MonthlyStatsOutcome::SkippedNoManager);
        };

        let window = MonthWindow::previous(today);
        let stats = self.generate_stats(department.id, window).await?;
        self.mailer
            .send_monthly_stats(&manager, &department, &stats)
            .await;

        tracing::info!(
            %department_id,
            manager_id = %manager.id,
            month = %window.label(),
            staff = stats.staff.len(),
            "Monthly stats sent"
        );
        Ok(MonthlyStatsOutcome::Sent)
    }
}
