//! Report Service Library
//!
//! Persistence, application services, mail, background jobs and CSV export
//! for the daily report workflow. The HTTP gateway and the combined binary
//! embed it through [`Runtime`].

pub mod config;
pub mod export;
pub mod infra;
pub mod jobs;
pub mod mail;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use common::AppResult;

use crate::config::ReportServiceConfig;
use crate::infra::Database;
use crate::jobs::JobQueues;
use crate::mail::QueuedMailer;
use crate::repository::DepartmentStore;
use crate::service::{ServiceContainer, Services};

/// Everything a process needs to serve requests and run jobs.
pub struct Runtime {
    pub config: ReportServiceConfig,
    pub database: Database,
    pub queues: JobQueues,
    pub services: Arc<Services>,
}

impl Runtime {
    /// Connect the database (applying pending migrations) and the job queues.
    pub async fn connect(config: ReportServiceConfig) -> AppResult<Self> {
        let database = Database::connect(&config.database).await?;
        let queues = JobQueues::connect(&config.database).await?;

        let mailer = Arc::new(QueuedMailer::new(
            queues.email.clone(),
            config.mail.from.clone(),
        ));
        let services = Arc::new(Services::from_connection(
            database.get_connection(),
            config.jwt.clone(),
            mailer,
        ));

        Ok(Self {
            config,
            database,
            queues,
            services,
        })
    }

    /// Run the job worker until Ctrl+C.
    pub async fn run_worker(&self) -> AppResult<()> {
        jobs::run_worker(
            self.queues.clone(),
            self.config.mail.clone(),
            self.services.statistics(),
        )
        .await
    }

    /// Queue this month's statistics mail for every active department.
    pub async fn enqueue_monthly_stats(&self) -> AppResult<usize> {
        let departments = DepartmentStore::new(self.database.get_connection());
        jobs::enqueue_monthly_stats(&departments, &self.queues.monthly_stats).await
    }
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> AppResult<()> {
    let config = ReportServiceConfig::from_env()?;
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Connect using environment configuration.
pub async fn connect_from_env() -> AppResult<Runtime> {
    let config = ReportServiceConfig::from_env()?;
    info!(?config, "Report service configuration loaded");
    Runtime::connect(config).await
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
