//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Staff member who writes daily reports
pub const ROLE_USER: &str = "user";

/// Department manager who reviews daily reports
pub const ROLE_MANAGER: &str = "manager";

/// Administrator managing departments and accounts
pub const ROLE_ADMIN: &str = "admin";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[ROLE_USER, ROLE_MANAGER, ROLE_ADMIN];

/// Check if a role value is valid
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

// =============================================================================
// Home paths (where a denied request is sent back to)
// =============================================================================

pub const ADMIN_HOME_PATH: &str = "/admin/dashboard";
pub const MANAGER_HOME_PATH: &str = "/manager/dashboard";
pub const USER_HOME_PATH: &str = "/user/dashboard";

// =============================================================================
// Report statuses
// =============================================================================

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_READ: &str = "read";
pub const STATUS_COMMENTED: &str = "commented";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Length of passwords generated for accounts created by an administrator
pub const GENERATED_PASSWORD_LENGTH: usize = 12;

/// Maximum user name length
pub const MAX_LENGTH_USERNAME: usize = 50;

/// Maximum email length
pub const MAX_LENGTH_EMAIL: usize = 255;

/// Maximum department name length
pub const MAX_LENGTH_DEPARTMENT_NAME: usize = 100;

/// Maximum department description length
pub const MAX_LENGTH_DESCRIPTION: usize = 500;

/// Maximum length of any free-text daily report field
pub const MAX_LENGTH_REPORT_FIELD: usize = 2000;

// =============================================================================
// Authentication
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Message key surfaced when a deactivated account tries to sign in
pub const INACTIVE_ACCOUNT_MESSAGE: &str = "inactive_account";

/// Message key surfaced for an active account that is otherwise not allowed in
pub const INACTIVE_MESSAGE: &str = "inactive";
