//! Department service - admin department management and the manager's own department.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppResult, OptionExt};
use domain::{
    department::validate_department, department::normalize_description, Action, ActiveFilter,
    Actor, CreateDepartment, Department, DepartmentStatus, DepartmentStatusFilter, Resource,
    SoftDeleteOutcome, Subject, UpdateDepartment, User, UserFilter, UserRole,
};

use crate::repository::{DepartmentRepository, UserRepository};

/// What a manager sees of their own department.
#[derive(Debug, Clone, Serialize)]
pub struct OwnDepartment {
    /// `None` when the manager is not assigned to a department
    pub department: Option<Department>,
    pub active_staff: u64,
    pub members: Vec<User>,
}

/// Department service trait for dependency injection.
#[async_trait]
pub trait DepartmentService: Send + Sync {
    async fn list_departments(
        &self,
        actor: &Actor,
        status: DepartmentStatusFilter,
    ) -> AppResult<Vec<Department>>;

    async fn get_department(&self, actor: &Actor, id: Uuid) -> AppResult<Department>;

    async fn create_department(
        &self,
        actor: &Actor,
        input: CreateDepartment,
    ) -> AppResult<Department>;

    /// Edit name and description; a requested status soft-deletes or restores
    async fn update_department(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateDepartment,
    ) -> AppResult<Department>;

    /// Soft delete, refused while users are assigned
    async fn delete_department(&self, actor: &Actor, id: Uuid) -> AppResult<SoftDeleteOutcome>;

    async fn restore_department(&self, actor: &Actor, id: Uuid) -> AppResult<Department>;

    /// The manager's department with members filtered by active status
    async fn own_department(&self, actor: &Actor, active: ActiveFilter) -> AppResult<OwnDepartment>;
}

/// Concrete implementation of DepartmentService using repositories.
pub struct DepartmentManager {
    departments: Arc<dyn DepartmentRepository>,
    users: Arc<dyn UserRepository>,
}

impl DepartmentManager {
    pub fn new(departments: Arc<dyn DepartmentRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { departments, users }
    }

    async fn find_authorized(&self, actor: &Actor, action: Action, id: Uuid) -> AppResult<Department> {
        let department = self.departments.find_by_id(id).await?;
        let department = actor.ability().authorize_found(
            action,
            Resource::Department,
            department,
            |d: &Department| Subject::Department { id: d.id },
        )?;
        Ok(department)
    }

    async fn member_count(&self, department_id: Uuid) -> AppResult<u64> {
        self.users
            .count(UserFilter {
                department_id: Some(department_id),
                ..Default::default()
            })
            .await
    }

    async fn soft_delete(&self, department: &mut Department) -> AppResult<SoftDeleteOutcome> {
        let members = self.member_count(department.id).await?;
        let outcome = department.soft_delete(members, Utc::now())?;
        Ok(outcome)
    }
}

#[async_trait]
impl DepartmentService for DepartmentManager {
    async fn list_departments(
        &self,
        actor: &Actor,
        status: DepartmentStatusFilter,
    ) -> AppResult<Vec<Department>> {
        actor.require_role(UserRole::Admin)?;
        actor
            .ability()
            .authorize(Action::Read, &Subject::Class(Resource::Department))?;

        self.departments.list(status).await
    }

    async fn get_department(&self, actor: &Actor, id: Uuid) -> AppResult<Department> {
        self.find_authorized(actor, Action::Read, id).await
    }

    async fn create_department(
        &self,
        actor: &Actor,
        input: CreateDepartment,
    ) -> AppResult<Department> {
        actor
            .ability()
            .authorize(Action::Create, &Subject::Class(Resource::Department))?;

        let department = Department::new(input.name, input.description);
        department.validate()?;
        let department = self.departments.create(department).await?;

        tracing::info!(department_id = %department.id, created_by = %actor.id, "Department created");
        Ok(department)
    }

    async fn update_department(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateDepartment,
    ) -> AppResult<Department> {
        let mut department = self.find_authorized(actor, Action::Update, id).await?;

        let name = input
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| department.name.clone());
        let description = match input.description {
            Some(description) => normalize_description(Some(description)),
            None => department.description.clone(),
        };
        validate_department(&name, description.as_deref())?;

        department.name = name;
        department.description = description;

        match input.status {
            Some(DepartmentStatus::Deleted) => {
                self.soft_delete(&mut department).await?;
            }
            Some(DepartmentStatus::Active) => department.restore(Utc::now()),
            None => {}
        }

        let department = self.departments.save(department).await?;
        tracing::info!(department_id = %department.id, updated_by = %actor.id, "Department updated");
        Ok(department)
    }

    async fn delete_department(&self, actor: &Actor, id: Uuid) -> AppResult<SoftDeleteOutcome> {
        let mut department = self.find_authorized(actor, Action::Destroy, id).await?;

        let outcome = self.soft_delete(&mut department).await?;
        if outcome == SoftDeleteOutcome::Deleted {
            self.departments.save(department).await?;
            tracing::info!(department_id = %id, deleted_by = %actor.id, "Department soft-deleted");
        }
        Ok(outcome)
    }

    async fn restore_department(&self, actor: &Actor, id: Uuid) -> AppResult<Department> {
        let mut department = self.find_authorized(actor, Action::Update, id).await?;
        if !department.is_deleted() {
            return Ok(department);
        }

        department.restore(Utc::now());
        let department = self.departments.save(department).await?;
        tracing::info!(department_id = %id, restored_by = %actor.id, "Department restored");
        Ok(department)
    }

    async fn own_department(&self, actor: &Actor, active: ActiveFilter) -> AppResult<OwnDepartment> {
        actor.require_role(UserRole::Manager)?;
        let Some(department_id) = actor.department_id else {
            return Ok(OwnDepartment {
                department: None,
                active_staff: 0,
                members: Vec::new(),
            });
        };

        let department = self
            .departments
            .find_by_id(department_id)
            .await?
            .ok_or_not_found("Department")?;
        actor
            .ability()
            .authorize(Action::Read, &Subject::Department { id: department.id })?;

        let staff = UserFilter {
            department_id: Some(department_id),
            roles: vec![UserRole::User],
            ..Default::default()
        };
        let active_staff = self
            .users
            .count(UserFilter {
                active: ActiveFilter::Active,
                ..staff.clone()
            })
            .await?;
        let members = self.users.list(UserFilter { active, ..staff }).await?;

        Ok(OwnDepartment {
            department: Some(department),
            active_staff,
            members,
        })
    }
}
