//! Report service configuration.

use std::env;

use common::{AppError, AppResult, DatabaseConfig, JwtConfig, MailConfig};
use domain::DEFAULT_JWT_EXPIRATION_HOURS;

/// Report service configuration.
#[derive(Clone)]
pub struct ReportServiceConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
}

impl std::fmt::Debug for ReportServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportServiceConfig")
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.database.max_connections)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt.expiration_hours)
            .field("mail", &self.mail)
            .finish()
    }
}

impl ReportServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails when `JWT_SECRET` is missing or shorter than the minimum length.
    pub fn from_env() -> AppResult<Self> {
        let defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            url: env::var("REPORT_SERVICE_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or(defaults.url),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
            min_connections: defaults.min_connections,
        };

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET")
                .map_err(|_| AppError::internal("JWT_SECRET environment variable must be set"))?,
            expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
        };
        jwt.validate().map_err(AppError::internal)?;

        let mail_defaults = MailConfig::default();
        let mail = MailConfig {
            from: env::var("MAIL_FROM").unwrap_or(mail_defaults.from),
            smtp_host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
        };

        Ok(Self {
            database,
            jwt,
            mail,
        })
    }
}
