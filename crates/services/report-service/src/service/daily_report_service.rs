//! Daily report service - submission by staff, review and export by managers.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{
    Action, Actor, DailyReport, ReportContent, ReportFilter, Resource, Subject, UserFilter,
    UserRole,
};

use crate::export;
use crate::mail::Mailer;
use crate::repository::{DailyReportRepository, DepartmentRepository, UserRepository};

/// A report listed together with its author.
#[derive(Debug, Clone, Serialize)]
pub struct OwnedReport {
    #[serde(flatten)]
    pub report: DailyReport,
    pub owner_name: String,
    pub owner_email: String,
}

/// Daily report service trait for dependency injection.
#[async_trait]
pub trait DailyReportService: Send + Sync {
    /// Submit a new pending report addressed to the department manager
    async fn create_report(&self, actor: &Actor, content: ReportContent) -> AppResult<DailyReport>;

    /// The actor's own reports, newest first
    async fn list_own_reports(&self, actor: &Actor, filter: ReportFilter)
        -> AppResult<Vec<DailyReport>>;

    async fn get_report(&self, actor: &Actor, id: Uuid) -> AppResult<DailyReport>;

    /// Owner edit of a pending report
    async fn update_report(
        &self,
        actor: &Actor,
        id: Uuid,
        content: ReportContent,
    ) -> AppResult<DailyReport>;

    /// Owner delete of a pending report
    async fn delete_report(&self, actor: &Actor, id: Uuid) -> AppResult<()>;

    /// Reports of the manager's department staff
    async fn list_department_reports(
        &self,
        actor: &Actor,
        filter: ReportFilter,
    ) -> AppResult<Vec<OwnedReport>>;

    /// Save manager notes and move the report through its lifecycle
    async fn review_report(
        &self,
        actor: &Actor,
        id: Uuid,
        notes: Option<String>,
    ) -> AppResult<DailyReport>;

    /// CSV export of the filtered department reports
    async fn export_reports(&self, actor: &Actor, filter: ReportFilter) -> AppResult<Vec<u8>>;
}

/// Concrete implementation of DailyReportService using repositories.
pub struct DailyReportManager {
    reports: Arc<dyn DailyReportRepository>,
    users: Arc<dyn UserRepository>,
    departments: Arc<dyn DepartmentRepository>,
    mailer: Arc<dyn Mailer>,
}

impl DailyReportManager {
    pub fn new(
        reports: Arc<dyn DailyReportRepository>,
        users: Arc<dyn UserRepository>,
        departments: Arc<dyn DepartmentRepository>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            reports,
            users,
            departments,
            mailer,
        }
    }

    /// Policy subject of a report; the owner's department is looked up
    /// unless the actor is the owner.
    async fn report_subject(&self, actor: &Actor, report: &DailyReport) -> AppResult<Subject> {
        let owner_department_id = if report.owner_id == actor.id {
            actor.department_id
        } else {
            self.users
                .find_by_id(report.owner_id)
                .await?
                .and_then(|owner| owner.department_id)
        };

        Ok(Subject::DailyReport {
            owner_id: report.owner_id,
            owner_department_id,
        })
    }

    async fn find_authorized(&self, actor: &Actor, action: Action, id: Uuid) -> AppResult<DailyReport> {
        let report = self.reports.find_by_id(id).await?;
        let report = actor.ability().authorize_found(
            action,
            Resource::DailyReport,
            report,
            |_| Subject::Class(Resource::DailyReport),
        )?;

        let subject = self.report_subject(actor, &report).await?;
        actor.ability().authorize(action, &subject)?;
        Ok(report)
    }

    /// Runs after the report is stored, so lookup failures are only logged.
    async fn notify_manager(&self, report: &DailyReport, manager_id: Uuid) {
        let lookup = futures::try_join!(
            self.users.find_by_id(manager_id),
            self.users.find_by_id(report.owner_id),
        );
        match lookup {
            Ok((Some(manager), Some(owner))) => {
                self.mailer
                    .send_manager_notification(report, &owner, &manager)
                    .await;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(
                report_id = %report.id,
                %manager_id,
                error = %e,
                "Skipped manager notification"
            ),
        }
    }

    fn authorize_department_reports(actor: &Actor) -> AppResult<()> {
        actor.require_role(UserRole::Manager)?;
        actor
            .ability()
            .authorize(Action::Read, &Subject::Class(Resource::DailyReport))?;
        Ok(())
    }
}

#[async_trait]
impl DailyReportService for DailyReportManager {
    async fn create_report(&self, actor: &Actor, content: ReportContent) -> AppResult<DailyReport> {
        actor.require_role(UserRole::User)?;
        actor
            .ability()
            .authorize(Action::Create, &Subject::Class(Resource::DailyReport))?;

        let department_id = actor.department_id.ok_or_else(|| {
            AppError::dependency("You must belong to a department to submit reports")
        })?;
        let department = self
            .departments
            .find_by_id(department_id)
            .await?
            .ok_or_not_found("Department")?;

        let report = DailyReport::submit(actor.id, department.manager_id, content)?;
        let report = self.reports.create(report).await?;

        tracing::info!(
            report_id = %report.id,
            owner_id = %report.owner_id,
            report_date = %report.report_date,
            "Daily report submitted"
        );

        if let Some(manager_id) = report.receiver_id {
            self.notify_manager(&report, manager_id).await;
        }
        Ok(report)
    }

    async fn list_own_reports(
        &self,
        actor: &Actor,
        filter: ReportFilter,
    ) -> AppResult<Vec<DailyReport>> {
        actor.require_role(UserRole::User)?;
        self.reports
            .list(ReportFilter {
                owner_id: Some(actor.id),
                owner_ids: None,
                receiver_id: None,
                ..filter
            })
            .await
    }

    async fn get_report(&self, actor: &Actor, id: Uuid) -> AppResult<DailyReport> {
        self.find_authorized(actor, Action::Read, id).await
    }

    async fn update_report(
        &self,
        actor: &Actor,
        id: Uuid,
        content: ReportContent,
    ) -> AppResult<DailyReport> {
        actor.require_role(UserRole::User)?;
        let mut report = self.find_authorized(actor, Action::Update, id).await?;
        report.ensure_owner_can_modify(actor)?;

        report.apply_content(content, Utc::now())?;
        let report = self.reports.save(report).await?;

        tracing::info!(report_id = %report.id, "Daily report updated");
        Ok(report)
    }

    async fn delete_report(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        actor.require_role(UserRole::User)?;
        let report = self.find_authorized(actor, Action::Destroy, id).await?;
        report.ensure_owner_can_modify(actor)?;

        self.reports.delete(report.id).await?;
        tracing::info!(report_id = %id, "Daily report deleted");
        Ok(())
    }

    async fn list_department_reports(
        &self,
        actor: &Actor,
        filter: ReportFilter,
    ) -> AppResult<Vec<OwnedReport>> {
        Self::authorize_department_reports(actor)?;

        let Some(department_id) = actor.department_id else {
            return Ok(Vec::new());
        };

        let staff = self
            .users
            .list(UserFilter {
                department_id: Some(department_id),
                roles: vec![UserRole::User],
                ..Default::default()
            })
            .await?;
        if staff.is_empty() {
            return Ok(Vec::new());
        }

        let reports = self
            .reports
            .list(ReportFilter {
                owner_ids: Some(staff.iter().map(|u| u.id).collect()),
                ..filter
            })
            .await?;

        let owners: HashMap<Uuid, _> = staff.into_iter().map(|u| (u.id, u)).collect();
        let rows = reports
            .into_iter()
            .filter_map(|report| {
                let owner = owners.get(&report.owner_id)?;
                Some(OwnedReport {
                    owner_name: owner.name.clone(),
                    owner_email: owner.email.clone(),
                    report,
                })
            })
            .collect();

        Ok(rows)
    }

    async fn review_report(
        &self,
        actor: &Actor,
        id: Uuid,
        notes: Option<String>,
    ) -> AppResult<DailyReport> {
        actor.require_role(UserRole::Manager)?;
        let mut report = self.find_authorized(actor, Action::Review, id).await?;

        let previous = report.status;
        report.apply_review(notes.as_deref(), Utc::now())?;
        let report = self.reports.save(report).await?;

        tracing::info!(
            report_id = %report.id,
            reviewed_by = %actor.id,
            from = %previous,
            to = %report.status,
            "Daily report reviewed"
        );
        Ok(report)
    }

    async fn export_reports(&self, actor: &Actor, filter: ReportFilter) -> AppResult<Vec<u8>> {
        Self::authorize_department_reports(actor)?;
        export::ensure_date_selected(&filter)?;
        let rows = self.list_department_reports(actor, filter).await?;
        export::reports_csv(&rows)
    }
}
