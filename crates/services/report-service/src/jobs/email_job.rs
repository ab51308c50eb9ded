//! Email background job.
//!
//! Emails are queued by `QueuedMailer` and delivered by the worker. When no
//! SMTP host is configured the message is logged instead of sent.

use apalis::prelude::Data;
use serde::{Deserialize, Serialize};

use common::{AppError, MailConfig};

use crate::mail::RenderedEmail;

/// Email job payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailJob {
    /// Recipient email address
    pub to: String,
    /// Email subject line
    pub subject: String,
    /// Plain text body
    pub body: String,
    /// Optional sender override (defaults to MAIL_FROM)
    #[serde(default)]
    pub from: Option<String>,
}

impl EmailJob {
    /// Create a new email job
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            from: None,
        }
    }

    /// Set custom sender address
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }
}

impl From<RenderedEmail> for EmailJob {
    fn from(email: RenderedEmail) -> Self {
        EmailJob::new(email.to, email.subject, email.body)
    }
}

/// Email job handler - processes email sending jobs
pub async fn email_job_handler(job: EmailJob, config: Data<MailConfig>) -> Result<(), AppError> {
    let from = job.from.as_deref().unwrap_or(&config.from);

    tracing::info!(
        to = %job.to,
        from = %from,
        subject = %job.subject,
        "Processing email job"
    );

    let Some(smtp_host) = config.smtp_host.as_deref() else {
        // Development mode: log the email instead of sending
        tracing::warn!("SMTP not configured - logging email instead of sending");
        tracing::info!(
            "=== EMAIL (not sent) ===\n\
             From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Body:\n{}\n\
             ========================",
            from,
            job.to,
            job.subject,
            job.body
        );
        return Ok(());
    };

    // TODO: deliver through an SMTP transport once a mail crate is added to the workspace
    tracing::warn!(
        smtp_host = %smtp_host,
        to = %job.to,
        "SMTP transport not available, email dropped"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handler_logs_without_smtp() {
        let job = EmailJob::new("ann@example.com", "Hi", "Body").with_from("hr@example.com");
        let result = email_job_handler(job, Data::new(MailConfig::default())).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_job_payload_round_trips_through_json() {
        let job = EmailJob::new("ann@example.com", "Hi", "Body");
        let json = serde_json::to_string(&job).unwrap();
        let parsed: EmailJob = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, job);
        assert_eq!(parsed.from, None);
    }
}
