//! Job queue connection and the background worker.

use std::sync::Arc;

use apalis::prelude::*;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;

use common::{AppError, AppResult, DatabaseConfig, MailConfig};

use super::{email_job_handler, monthly_stats_job_handler, EmailJob, MonthlyStatsJob};
use crate::service::StatisticsService;

/// Postgres backed queues shared by producers and the worker.
#[derive(Clone)]
pub struct JobQueues {
    pub email: PostgresStorage<EmailJob>,
    pub monthly_stats: PostgresStorage<MonthlyStatsJob>,
}

impl JobQueues {
    /// Connect to the database and create the apalis tables when missing.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))?;

        PostgresStorage::setup(&pool)
            .await
            .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

        Ok(Self {
            email: PostgresStorage::new(pool.clone()),
            monthly_stats: PostgresStorage::new(pool),
        })
    }
}

/// Process email and statistics jobs until Ctrl+C.
pub async fn run_worker(
    queues: JobQueues,
    mail: MailConfig,
    stats: Arc<dyn StatisticsService>,
) -> AppResult<()> {
    let email_worker = WorkerBuilder::new("email-worker")
        .data(mail)
        .backend(queues.email)
        .build_fn(email_job_handler);

    let stats_worker = WorkerBuilder::new("monthly-stats-worker")
        .data(stats)
        .backend(queues.monthly_stats)
        .build_fn(monthly_stats_job_handler);

    let monitor = Monitor::new().register(email_worker).register(stats_worker);

    tracing::info!("Job worker started. Press Ctrl+C to stop.");

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Job worker stopped.");
    Ok(())
}
