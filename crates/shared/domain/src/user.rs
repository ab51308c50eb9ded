//! User domain entity, roles and department-manager linkage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    ADMIN_HOME_PATH, INACTIVE_ACCOUNT_MESSAGE, INACTIVE_MESSAGE, MANAGER_HOME_PATH,
    MAX_LENGTH_EMAIL, MAX_LENGTH_USERNAME, ROLE_ADMIN, ROLE_MANAGER, ROLE_USER, USER_HOME_PATH,
};
use crate::error::{DomainError, DomainResult};
use crate::validation::{is_valid_email, normalize_email, ValidationErrors};

/// User roles enumeration. Exactly one per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Manager,
    Admin,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, UserRole::Manager)
    }

    /// Landing page for this role; denied requests are sent back here.
    pub fn home_path(&self) -> &'static str {
        match self {
            UserRole::Admin => ADMIN_HOME_PATH,
            UserRole::Manager => MANAGER_HOME_PATH,
            UserRole::User => USER_HOME_PATH,
        }
    }

    /// Strict parse, `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            ROLE_ADMIN => Some(UserRole::Admin),
            ROLE_MANAGER => Some(UserRole::Manager),
            ROLE_USER => Some(UserRole::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::Manager => ROLE_MANAGER,
            UserRole::User => ROLE_USER,
        }
    }
}

/// Lenient conversion used for stored values: anything unknown is a plain user.
impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        UserRole::parse(s).unwrap_or(UserRole::User)
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        UserRole::from(s.as_str())
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    /// Soft-disable flag. Inactive accounts keep their data but cannot sign in.
    pub active: bool,
    pub department_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user
    pub fn new(
        email: String,
        password_hash: String,
        name: String,
        role: UserRole,
        department_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(&email),
            password_hash,
            name: name.trim().to_string(),
            role,
            active: true,
            department_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    /// Only active accounts may sign in.
    pub fn active_for_authentication(&self) -> bool {
        self.active
    }

    /// Message key explaining why authentication was refused.
    pub fn inactive_message(&self) -> &'static str {
        if self.active {
            INACTIVE_MESSAGE
        } else {
            INACTIVE_ACCOUNT_MESSAGE
        }
    }

    /// Fail with `InactiveAccount` for deactivated users.
    pub fn ensure_active(&self) -> DomainResult<()> {
        if self.active_for_authentication() {
            Ok(())
        } else {
            Err(DomainError::InactiveAccount)
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    /// Snapshot of the fields that drive the department manager pointer.
    pub fn assignment(&self) -> Assignment {
        Assignment {
            role: self.role,
            department_id: self.department_id,
            active: self.active,
        }
    }

    /// Check name and email.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_identity(&self.name, &self.email)
    }
}

/// Validate the identity fields shared by create and update.
pub fn validate_identity(name: &str, email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check_required("name", name, MAX_LENGTH_USERNAME);

    let email = normalize_email(email);
    if email.is_empty() {
        errors.add("email", "can't be blank");
    } else if email.chars().count() > MAX_LENGTH_EMAIL {
        errors.check_max_length("email", &email, MAX_LENGTH_EMAIL);
    } else if !is_valid_email(&email) {
        errors.add("email", "is invalid");
    }

    errors.into_result()
}

/// Role and department of a user at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub role: UserRole,
    pub department_id: Option<Uuid>,
    pub active: bool,
}

impl Assignment {
    /// Department this assignment manages, if any.
    pub fn managed_department(&self) -> Option<Uuid> {
        if self.role.is_manager() {
            self.department_id
        } else {
            None
        }
    }

    /// Department this assignment may hold the manager pointer of.
    /// Deactivated managers never take a pointer.
    pub fn pointer_department(&self) -> Option<Uuid> {
        if self.active {
            self.managed_department()
        } else {
            None
        }
    }
}

/// Department manager pointer changes caused by saving one user.
///
/// Computed before the save and applied by the repository in the same
/// transaction: first `release`, then `assign`. Releasing only clears a
/// pointer that still references the saved user, so a department that was
/// already handed to someone else is left alone. Assigning only happens
/// when an active manager starts managing a department, either by a role,
/// department or activation change; a plain edit never moves the pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerDelta {
    /// Department whose pointer must stop referencing the user
    pub release: Option<Uuid>,
    /// Department whose pointer must reference the user
    pub assign: Option<Uuid>,
}

impl ManagerDelta {
    /// Compare the state before the save (`None` for a new user) with the
    /// state after it.
    pub fn compute(before: Option<Assignment>, after: Assignment) -> Self {
        let release = before.and_then(|old| {
            let old_department = old.managed_department()?;
            let still_managing = after.managed_department() == Some(old_department);
            (!still_managing).then_some(old_department)
        });

        let held = before.and_then(|old| old.pointer_department());
        let assign = after.pointer_department().filter(|&department| held != Some(department));

        Self { release, assign }
    }

    pub fn is_empty(&self) -> bool {
        self.release.is_none() && self.assign.is_none()
    }
}

/// Enforce one active manager per department.
///
/// `existing_manager` is the active manager currently found for the
/// candidate's department, if any.
pub fn ensure_single_manager(
    candidate_id: Uuid,
    candidate: Assignment,
    existing_manager: Option<&User>,
) -> Result<(), ValidationErrors> {
    if candidate.managed_department().is_none() {
        return Ok(());
    }

    match existing_manager {
        Some(manager) if manager.id != candidate_id => Err(ValidationErrors::single(
            "role",
            "department already has a manager",
        )),
        _ => Ok(()),
    }
}

/// Tri-state filter over the `active` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ActiveFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl ActiveFilter {
    /// The `active` value to match, `None` for no predicate.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ActiveFilter::All => None,
            ActiveFilter::Active => Some(true),
            ActiveFilter::Inactive => Some(false),
        }
    }
}

/// Query over users. Every field narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Case-insensitive substring of the email
    pub email: Option<String>,
    pub active: ActiveFilter,
    pub department_id: Option<Uuid>,
    /// Only users without a department
    pub unassigned_only: bool,
    pub roles: Vec<UserRole>,
}

/// User creation data transfer object
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    /// Generated when absent
    pub password: Option<String>,
    pub name: String,
    pub role: UserRole,
    pub department_id: Option<Uuid>,
}

/// User update data transfer object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    /// `Some(None)` clears the department
    pub department_id: Option<Option<Uuid>>,
    pub active: Option<bool>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub active: bool,
    pub department_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            active: user.active,
            department_id: user.department_id,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole, department_id: Option<Uuid>) -> User {
        User::new(
            "someone@example.com".to_string(),
            "hash".to_string(),
            "Someone".to_string(),
            role,
            department_id,
        )
    }

    fn assignment(role: UserRole, department_id: Option<Uuid>) -> Assignment {
        Assignment {
            role,
            department_id,
            active: true,
        }
    }

    fn inactive(role: UserRole, department_id: Option<Uuid>) -> Assignment {
        Assignment {
            active: false,
            ..assignment(role, department_id)
        }
    }

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!(UserRole::parse("manager"), Some(UserRole::Manager));
        assert_eq!(UserRole::parse("boss"), None);
        assert_eq!(UserRole::from("boss"), UserRole::User);
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_home_paths_differ_per_role() {
        assert_eq!(UserRole::Admin.home_path(), ADMIN_HOME_PATH);
        assert_eq!(UserRole::Manager.home_path(), MANAGER_HOME_PATH);
        assert_eq!(UserRole::User.home_path(), USER_HOME_PATH);
    }

    #[test]
    fn test_new_user_normalizes_email() {
        let user = User::new(
            " Staff@Example.COM".to_string(),
            "hash".to_string(),
            " Staff ".to_string(),
            UserRole::User,
            None,
        );
        assert_eq!(user.email, "staff@example.com");
        assert_eq!(user.name, "Staff");
        assert!(user.active);
    }

    #[test]
    fn test_inactive_message() {
        let mut u = user(UserRole::User, None);
        assert!(u.active_for_authentication());
        assert_eq!(u.inactive_message(), INACTIVE_MESSAGE);

        u.deactivate();
        assert!(!u.active_for_authentication());
        assert_eq!(u.inactive_message(), INACTIVE_ACCOUNT_MESSAGE);
        assert!(matches!(u.ensure_active(), Err(DomainError::InactiveAccount)));
    }

    #[test]
    fn test_validate_identity() {
        assert!(validate_identity("Ann", "ann@example.com").is_ok());

        let errors = validate_identity("", "annexample.com").unwrap_err();
        assert!(errors.has_field("name"));
        assert_eq!(errors.for_field("email").next(), Some("is invalid"));

        let long_name = "x".repeat(MAX_LENGTH_USERNAME + 1);
        let errors = validate_identity(&long_name, "ann@example.com").unwrap_err();
        assert!(errors.has_field("name"));
    }

    #[test]
    fn test_delta_new_manager_assigns() {
        let dept = Uuid::new_v4();
        let delta = ManagerDelta::compute(None, assignment(UserRole::Manager, Some(dept)));
        assert_eq!(delta.release, None);
        assert_eq!(delta.assign, Some(dept));
    }

    #[test]
    fn test_delta_new_staff_is_empty() {
        let delta = ManagerDelta::compute(None, assignment(UserRole::User, Some(Uuid::new_v4())));
        assert!(delta.is_empty());
    }

    #[test]
    fn test_delta_manager_demoted_releases() {
        let dept = Uuid::new_v4();
        let delta = ManagerDelta::compute(
            Some(assignment(UserRole::Manager, Some(dept))),
            assignment(UserRole::User, Some(dept)),
        );
        assert_eq!(delta.release, Some(dept));
        assert_eq!(delta.assign, None);
    }

    #[test]
    fn test_delta_manager_moved_releases_and_assigns() {
        let old = Uuid::new_v4();
        let new = Uuid::new_v4();
        let delta = ManagerDelta::compute(
            Some(assignment(UserRole::Manager, Some(old))),
            assignment(UserRole::Manager, Some(new)),
        );
        assert_eq!(delta.release, Some(old));
        assert_eq!(delta.assign, Some(new));
    }

    #[test]
    fn test_delta_unchanged_manager_is_empty() {
        let dept = Uuid::new_v4();
        let delta = ManagerDelta::compute(
            Some(assignment(UserRole::Manager, Some(dept))),
            assignment(UserRole::Manager, Some(dept)),
        );
        assert!(delta.is_empty());
    }

    #[test]
    fn test_delta_inactive_manager_edit_never_assigns() {
        let dept = Uuid::new_v4();
        let delta = ManagerDelta::compute(
            Some(inactive(UserRole::Manager, Some(dept))),
            inactive(UserRole::Manager, Some(dept)),
        );
        assert!(delta.is_empty());
    }

    #[test]
    fn test_delta_new_inactive_manager_never_assigns() {
        let delta = ManagerDelta::compute(None, inactive(UserRole::Manager, Some(Uuid::new_v4())));
        assert!(delta.is_empty());
    }

    #[test]
    fn test_delta_reactivated_manager_assigns() {
        let dept = Uuid::new_v4();
        let delta = ManagerDelta::compute(
            Some(inactive(UserRole::Manager, Some(dept))),
            assignment(UserRole::Manager, Some(dept)),
        );
        assert_eq!(delta.release, None);
        assert_eq!(delta.assign, Some(dept));
    }

    #[test]
    fn test_delta_deactivated_manager_keeps_pointer() {
        let dept = Uuid::new_v4();
        let delta = ManagerDelta::compute(
            Some(assignment(UserRole::Manager, Some(dept))),
            inactive(UserRole::Manager, Some(dept)),
        );
        assert!(delta.is_empty());
    }

    #[test]
    fn test_delta_manager_unassigned_releases() {
        let dept = Uuid::new_v4();
        let delta = ManagerDelta::compute(
            Some(assignment(UserRole::Manager, Some(dept))),
            assignment(UserRole::Manager, None),
        );
        assert_eq!(delta.release, Some(dept));
        assert_eq!(delta.assign, None);
    }

    #[test]
    fn test_single_manager_rejects_second_manager() {
        let dept = Uuid::new_v4();
        let existing = user(UserRole::Manager, Some(dept));
        let result = ensure_single_manager(
            Uuid::new_v4(),
            assignment(UserRole::Manager, Some(dept)),
            Some(&existing),
        );
        let errors = result.unwrap_err();
        assert!(errors.has_field("role"));
    }

    #[test]
    fn test_single_manager_allows_same_record() {
        let dept = Uuid::new_v4();
        let existing = user(UserRole::Manager, Some(dept));
        assert!(ensure_single_manager(
            existing.id,
            assignment(UserRole::Manager, Some(dept)),
            Some(&existing),
        )
        .is_ok());
    }

    #[test]
    fn test_single_manager_ignores_staff() {
        let dept = Uuid::new_v4();
        let existing = user(UserRole::Manager, Some(dept));
        assert!(ensure_single_manager(
            Uuid::new_v4(),
            assignment(UserRole::User, Some(dept)),
            Some(&existing),
        )
        .is_ok());
    }

    #[test]
    fn test_active_filter_flags() {
        assert_eq!(ActiveFilter::All.as_flag(), None);
        assert_eq!(ActiveFilter::Active.as_flag(), Some(true));
        assert_eq!(ActiveFilter::Inactive.as_flag(), Some(false));
    }
}
