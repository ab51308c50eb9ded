//! Background jobs backed by apalis Postgres storage.

mod email_job;
mod monthly_stats_job;
mod worker;

pub use email_job::{email_job_handler, EmailJob};
pub use monthly_stats_job::{enqueue_monthly_stats, monthly_stats_job_handler, MonthlyStatsJob};
pub use worker::{run_worker, JobQueues};
