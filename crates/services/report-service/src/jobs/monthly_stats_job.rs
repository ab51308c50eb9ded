//! Monthly statistics job.
//!
//! A cron entry runs `report-service stats enqueue-monthly` once a month,
//! which queues one job per active department. The worker mails the
//! previous month's numbers to each department manager.

use apalis::prelude::{Data, Storage};
use apalis_sql::postgres::PostgresStorage;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::DepartmentStatusFilter;

use crate::repository::DepartmentRepository;
use crate::service::{MonthlyStatsOutcome, StatisticsService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyStatsJob {
    pub department_id: Uuid,
}

pub async fn monthly_stats_job_handler(
    job: MonthlyStatsJob,
    stats: Data<Arc<dyn StatisticsService>>,
) -> Result<(), AppError> {
    tracing::info!(department_id = %job.department_id, "Processing monthly stats job");

    let outcome = stats
        .send_monthly_stats(job.department_id, Utc::now().date_naive())
        .await?;

    if outcome != MonthlyStatsOutcome::Sent {
        tracing::info!(department_id = %job.department_id, ?outcome, "Monthly stats not sent");
    }
    Ok(())
}

/// Queue one statistics job per active department.
pub async fn enqueue_monthly_stats(
    departments: &dyn DepartmentRepository,
    storage: &PostgresStorage<MonthlyStatsJob>,
) -> AppResult<usize> {
    let active = departments.list(DepartmentStatusFilter::Active).await?;
    let mut storage = storage.clone();

    for department in &active {
        storage
            .push(MonthlyStatsJob {
                department_id: department.id,
            })
            .await
            .map_err(|e| AppError::internal(format!("Failed to queue stats job: {}", e)))?;
    }

    tracing::info!(departments = active.len(), "Monthly stats jobs queued");
    Ok(active.len())
}
