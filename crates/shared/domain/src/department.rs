//! Department domain entity with its soft-delete lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_LENGTH_DEPARTMENT_NAME, MAX_LENGTH_DESCRIPTION};
use crate::error::{DomainError, DomainResult};
use crate::validation::ValidationErrors;

/// Organizational unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Weak back-reference to the department's manager
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// `None` while the department is active
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Result of a soft delete that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftDeleteOutcome {
    Deleted,
    AlreadyDeleted,
}

impl Department {
    pub fn new(name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            description: normalize_description(description),
            manager_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Soft delete, refused while the department still has members.
    ///
    /// Deleting an already deleted department succeeds without touching it.
    pub fn soft_delete(
        &mut self,
        member_count: u64,
        now: DateTime<Utc>,
    ) -> DomainResult<SoftDeleteOutcome> {
        if member_count > 0 {
            return Err(DomainError::dependency(format!(
                "Cannot delete department with {} assigned user(s)",
                member_count
            )));
        }

        if self.is_deleted() {
            return Ok(SoftDeleteOutcome::AlreadyDeleted);
        }

        self.deleted_at = Some(now);
        self.updated_at = now;
        Ok(SoftDeleteOutcome::Deleted)
    }

    pub fn restore(&mut self, now: DateTime<Utc>) {
        if self.deleted_at.take().is_some() {
            self.updated_at = now;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_department(&self.name, self.description.as_deref())
    }
}

/// Check name and description limits.
pub fn validate_department(name: &str, description: Option<&str>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check_required("name", name, MAX_LENGTH_DEPARTMENT_NAME);
    if let Some(description) = description {
        errors.check_max_length("description", description, MAX_LENGTH_DESCRIPTION);
    }
    errors.into_result()
}

/// Blank descriptions are stored as `None`.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Which departments a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum DepartmentStatusFilter {
    #[default]
    All,
    Active,
    Deleted,
}

impl DepartmentStatusFilter {
    /// Parse the query parameter. An empty value means `All`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "" | "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    pub fn matches(&self, department: &Department) -> bool {
        match self {
            Self::All => true,
            Self::Active => !department.is_deleted(),
            Self::Deleted => department.is_deleted(),
        }
    }
}

/// Status an administrator may request while editing a department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum DepartmentStatus {
    Active,
    Deleted,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDepartment {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<DepartmentStatus>,
}
