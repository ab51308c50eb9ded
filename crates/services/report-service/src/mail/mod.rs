//! Outgoing notifications.
//!
//! Sending is fire-and-forget: a failure to queue a message is logged and
//! never reaches the caller.

mod templates;

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use async_trait::async_trait;

use domain::{DailyReport, Department, DepartmentStats, User};

use crate::jobs::EmailJob;

pub use templates::{manager_notification, monthly_stats, welcome_email, RenderedEmail};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Mail dispatch used by the application services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Credentials for a freshly created account
    async fn send_welcome_email(&self, user: &User, password: &str);

    /// Tell the receiving manager a report was submitted
    async fn send_manager_notification(&self, report: &DailyReport, owner: &User, manager: &User);

    /// Monthly per-staff statistics for a department
    async fn send_monthly_stats(
        &self,
        manager: &User,
        department: &Department,
        stats: &DepartmentStats,
    );
}

/// Mailer that renders templates and queues them as `EmailJob`s.
#[derive(Clone)]
pub struct QueuedMailer {
    storage: PostgresStorage<EmailJob>,
    from: String,
}

impl QueuedMailer {
    pub fn new(storage: PostgresStorage<EmailJob>, from: impl Into<String>) -> Self {
        Self {
            storage,
            from: from.into(),
        }
    }

    async fn enqueue(&self, email: RenderedEmail) {
        let to = email.to.clone();
        let job = EmailJob::from(email).with_from(self.from.clone());
        let mut storage = self.storage.clone();

        match storage.push(job).await {
            Ok(_) => tracing::debug!(to = %to, "Email queued"),
            Err(e) => tracing::warn!(to = %to, error = %e, "Failed to queue email"),
        }
    }
}

#[async_trait]
impl Mailer for QueuedMailer {
    async fn send_welcome_email(&self, user: &User, password: &str) {
        self.enqueue(welcome_email(user, password)).await;
    }

    async fn send_manager_notification(&self, report: &DailyReport, owner: &User, manager: &User) {
        self.enqueue(manager_notification(report, owner, manager)).await;
    }

    async fn send_monthly_stats(
        &self,
        manager: &User,
        department: &Department,
        stats: &DepartmentStats,
    ) {
        self.enqueue(monthly_stats(manager, department, stats)).await;
    }
}
