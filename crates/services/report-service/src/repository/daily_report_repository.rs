//! Daily report repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};
use uuid::Uuid;

use super::entities::daily_report::{self, ActiveModel, Entity as DailyReportEntity};
use common::{AppError, AppResult};
use domain::{DailyReport, ReportFilter};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Daily report repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DailyReportRepository: Send + Sync {
    /// Find report by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DailyReport>>;

    /// List reports matching the filter, newest first
    async fn list(&self, filter: ReportFilter) -> AppResult<Vec<DailyReport>>;

    /// Count reports matching the filter
    async fn count(&self, filter: ReportFilter) -> AppResult<u64>;

    /// Insert a new report
    async fn create(&self, report: DailyReport) -> AppResult<DailyReport>;

    /// Update an existing report
    async fn save(&self, report: DailyReport) -> AppResult<DailyReport>;

    /// Permanently delete a report
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of DailyReportRepository
pub struct DailyReportStore {
    db: DatabaseConnection,
}

impl DailyReportStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn filtered(filter: &ReportFilter) -> Select<DailyReportEntity> {
    let mut query = DailyReportEntity::find();

    if let Some(owner_ids) = &filter.owner_ids {
        query = query.filter(daily_report::Column::OwnerId.is_in(owner_ids.iter().copied()));
    }
    if let Some(owner_id) = filter.owner_id {
        query = query.filter(daily_report::Column::OwnerId.eq(owner_id));
    }
    if let Some(date) = filter.report_date {
        query = query.filter(daily_report::Column::ReportDate.eq(date));
    }
    if let Some(from) = filter.date_from {
        query = query.filter(daily_report::Column::ReportDate.gte(from));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(daily_report::Column::ReportDate.lte(to));
    }
    if let Some(status) = filter.status {
        query = query.filter(daily_report::Column::Status.eq(status.as_str()));
    }
    if let Some(receiver_id) = filter.receiver_id {
        query = query.filter(daily_report::Column::ReceiverId.eq(receiver_id));
    }

    query
}

#[async_trait]
impl DailyReportRepository for DailyReportStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DailyReport>> {
        let result = DailyReportEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(DailyReport::from))
    }

    async fn list(&self, filter: ReportFilter) -> AppResult<Vec<DailyReport>> {
        let models = filtered(&filter)
            .order_by_desc(daily_report::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(DailyReport::from).collect())
    }

    async fn count(&self, filter: ReportFilter) -> AppResult<u64> {
        filtered(&filter)
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn create(&self, report: DailyReport) -> AppResult<DailyReport> {
        let model = ActiveModel::from(&report)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(DailyReport::from(model))
    }

    async fn save(&self, report: DailyReport) -> AppResult<DailyReport> {
        let model = ActiveModel::from(&report)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(DailyReport::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = DailyReportEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Daily report".to_string()));
        }

        Ok(())
    }
}
