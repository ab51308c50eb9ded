//! User service - account administration and department staffing.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{
    ensure_single_manager, user::validate_identity, validation::normalize_email, Action,
    ActiveFilter, Actor, Assignment, CreateUser, ManagerDelta, Password, Resource, Subject,
    UpdateUser, User, UserFilter, UserRole,
};

use crate::mail::Mailer;
use crate::repository::{DepartmentRepository, UserRepository};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Load a user for request authentication
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Admin listing of non-admin accounts
    async fn list_users(&self, actor: &Actor, filter: UserFilter) -> AppResult<Vec<User>>;

    async fn show_user(&self, actor: &Actor, id: Uuid) -> AppResult<User>;

    /// Create an account; a password is generated when none is given
    async fn create_user(&self, actor: &Actor, input: CreateUser) -> AppResult<User>;

    async fn update_user(&self, actor: &Actor, id: Uuid, input: UpdateUser) -> AppResult<User>;

    /// Soft-disable an account
    async fn deactivate_user(&self, actor: &Actor, id: Uuid) -> AppResult<User>;

    /// Active `user` accounts without a department
    async fn available_users(&self, actor: &Actor) -> AppResult<Vec<User>>;

    /// Move an unassigned user into the manager's department
    async fn assign_to_department(&self, actor: &Actor, user_id: Uuid) -> AppResult<User>;

    /// Take a user out of the manager's department
    async fn remove_from_department(&self, actor: &Actor, user_id: Uuid) -> AppResult<User>;
}

/// Concrete implementation of UserService using repositories.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
    departments: Arc<dyn DepartmentRepository>,
    mailer: Arc<dyn Mailer>,
}

impl UserManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        departments: Arc<dyn DepartmentRepository>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            users,
            departments,
            mailer,
        }
    }

    /// The department must exist and not be deleted.
    async fn ensure_department(&self, department_id: Option<Uuid>) -> AppResult<()> {
        let Some(id) = department_id else {
            return Ok(());
        };
        match self.departments.find_by_id(id).await? {
            Some(department) if !department.is_deleted() => Ok(()),
            _ => Err(AppError::field("department_id", "does not exist")),
        }
    }

    async fn ensure_email_available(&self, email: &str, user_id: Option<Uuid>) -> AppResult<()> {
        match self.users.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != user_id => {
                Err(AppError::field("email", "has already been taken"))
            }
            _ => Ok(()),
        }
    }

    /// Only active managers compete for a department.
    async fn ensure_manager_slot(&self, user_id: Uuid, after: Assignment) -> AppResult<()> {
        let Some(department_id) = after.pointer_department() else {
            return Ok(());
        };
        let existing = self.users.find_active_manager(department_id).await?;
        ensure_single_manager(user_id, after, existing.as_ref())?;
        Ok(())
    }

    async fn find_authorized(&self, actor: &Actor, action: Action, id: Uuid) -> AppResult<User> {
        let user = self.users.find_by_id(id).await?;
        let user = actor
            .ability()
            .authorize_found(action, Resource::User, user, Subject::user)?;
        Ok(user)
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    async fn list_users(&self, actor: &Actor, mut filter: UserFilter) -> AppResult<Vec<User>> {
        actor.require_role(UserRole::Admin)?;
        actor
            .ability()
            .authorize(Action::Read, &Subject::Class(Resource::User))?;

        if filter.roles.is_empty() {
            filter.roles = vec![UserRole::Manager, UserRole::User];
        }
        self.users.list(filter).await
    }

    async fn show_user(&self, actor: &Actor, id: Uuid) -> AppResult<User> {
        self.find_authorized(actor, Action::Read, id).await
    }

    async fn create_user(&self, actor: &Actor, input: CreateUser) -> AppResult<User> {
        actor.require_role(UserRole::Admin)?;
        actor
            .ability()
            .authorize(Action::Create, &Subject::Class(Resource::User))?;

        validate_identity(&input.name, &input.email)?;
        let plain_password = match input.password.filter(|p| !p.is_empty()) {
            Some(password) => password,
            None => Password::generate(),
        };
        let password_hash = Password::new(&plain_password)?.into_string();

        let user = User::new(
            input.email,
            password_hash,
            input.name,
            input.role,
            input.department_id,
        );

        self.ensure_department(user.department_id).await?;
        self.ensure_email_available(&user.email, None).await?;
        self.ensure_manager_slot(user.id, user.assignment()).await?;

        let delta = ManagerDelta::compute(None, user.assignment());
        let user = self.users.create(user, delta).await?;

        tracing::info!(
            user_id = %user.id,
            role = %user.role,
            created_by = %actor.id,
            "User created"
        );
        self.mailer.send_welcome_email(&user, &plain_password).await;

        Ok(user)
    }

    async fn update_user(&self, actor: &Actor, id: Uuid, input: UpdateUser) -> AppResult<User> {
        let mut user = self.find_authorized(actor, Action::Update, id).await?;
        let before = user.assignment();

        if let Some(name) = input.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = input.email {
            user.email = normalize_email(&email);
        }
        if let Some(role) = input.role {
            user.role = role;
        }
        if let Some(department_id) = input.department_id {
            user.department_id = department_id;
        }
        if let Some(active) = input.active {
            if !active && user.id == actor.id {
                return Err(AppError::dependency("You cannot deactivate your own account"));
            }
            user.active = active;
        }

        user.validate()?;
        if user.department_id != before.department_id {
            self.ensure_department(user.department_id).await?;
        }
        self.ensure_email_available(&user.email, Some(user.id)).await?;
        self.ensure_manager_slot(user.id, user.assignment()).await?;

        let delta = ManagerDelta::compute(Some(before), user.assignment());
        let user = self.users.save(user, delta).await?;

        tracing::info!(user_id = %user.id, updated_by = %actor.id, "User updated");
        Ok(user)
    }

    async fn deactivate_user(&self, actor: &Actor, id: Uuid) -> AppResult<User> {
        actor.require_role(UserRole::Admin)?;
        if id == actor.id {
            return Err(AppError::dependency("You cannot deactivate your own account"));
        }
        let mut user = self.find_authorized(actor, Action::Destroy, id).await?;
        if !user.active {
            return Ok(user);
        }

        user.deactivate();
        let user = self.users.save(user, ManagerDelta::default()).await?;

        tracing::info!(user_id = %user.id, deactivated_by = %actor.id, "User deactivated");
        Ok(user)
    }

    async fn available_users(&self, actor: &Actor) -> AppResult<Vec<User>> {
        actor.require_role(UserRole::Manager)?;
        actor
            .ability()
            .authorize(Action::Create, &Subject::Class(Resource::User))?;

        let users = self
            .users
            .list(UserFilter {
                active: ActiveFilter::Active,
                unassigned_only: true,
                roles: vec![UserRole::User],
                ..Default::default()
            })
            .await?;

        if users.is_empty() {
            return Err(AppError::dependency("There are no users available to assign"));
        }
        Ok(users)
    }

    async fn assign_to_department(&self, actor: &Actor, user_id: Uuid) -> AppResult<User> {
        actor.require_role(UserRole::Manager)?;
        actor
            .ability()
            .authorize(Action::Create, &Subject::Class(Resource::User))?;
        let department_id = actor.department_id.ok_or_else(|| actor.forbidden())?;

        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        if user.role != UserRole::User || !user.active {
            return Err(AppError::field("user_id", "is not an assignable user"));
        }
        if user.department_id.is_some() {
            return Err(AppError::dependency("User already belongs to a department"));
        }

        let before = user.assignment();
        user.department_id = Some(department_id);
        let delta = ManagerDelta::compute(Some(before), user.assignment());
        let user = self.users.save(user, delta).await?;

        tracing::info!(user_id = %user.id, %department_id, "User assigned to department");
        Ok(user)
    }

    async fn remove_from_department(&self, actor: &Actor, user_id: Uuid) -> AppResult<User> {
        actor.require_role(UserRole::Manager)?;
        if user_id == actor.id {
            return Err(AppError::dependency(
                "You cannot remove yourself from your department",
            ));
        }

        let mut user = self.find_authorized(actor, Action::Destroy, user_id).await?;
        let before = user.assignment();
        user.department_id = None;
        let delta = ManagerDelta::compute(Some(before), user.assignment());
        let user = self.users.save(user, delta).await?;

        tracing::info!(user_id = %user.id, removed_by = %actor.id, "User removed from department");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Department;
    use mockall::predicate::eq;

    use crate::mail::MockMailer;
    use crate::repository::{MockDepartmentRepository, MockUserRepository};

    fn admin() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role: UserRole::Admin,
            department_id: None,
        }
    }

    fn manager_of(department_id: Uuid) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role: UserRole::Manager,
            department_id: Some(department_id),
        }
    }

    fn user(role: UserRole, department_id: Option<Uuid>) -> User {
        User::new(
            "member@example.com".to_string(),
            "hash".to_string(),
            "Member".to_string(),
            role,
            department_id,
        )
    }

    fn active_department(id: Uuid) -> Department {
        let mut department = Department::new("Sales".to_string(), None);
        department.id = id;
        department
    }

    fn service(
        users: MockUserRepository,
        departments: MockDepartmentRepository,
        mailer: MockMailer,
    ) -> UserManager {
        UserManager::new(Arc::new(users), Arc::new(departments), Arc::new(mailer))
    }

    fn create_input(role: UserRole, department_id: Option<Uuid>) -> CreateUser {
        CreateUser {
            email: "New@Example.com".to_string(),
            password: None,
            name: "New Person".to_string(),
            role,
            department_id,
        }
    }

    #[tokio::test]
    async fn test_create_manager_assigns_department_pointer() {
        let dept = Uuid::new_v4();

        let mut departments = MockDepartmentRepository::new();
        departments
            .expect_find_by_id()
            .with(eq(dept))
            .returning(|id| Ok(Some(active_department(id))));

        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_find_active_manager()
            .with(eq(dept))
            .returning(|_| Ok(None));
        users
            .expect_create()
            .withf(move |user, delta| {
                user.email == "new@example.com"
                    && delta.assign == Some(dept)
                    && delta.release.is_none()
            })
            .returning(|user, _| Ok(user));

        let mut mailer = MockMailer::new();
        mailer
            .expect_send_welcome_email()
            .withf(|_, password| password.len() == domain::GENERATED_PASSWORD_LENGTH)
            .times(1)
            .returning(|_, _| ());

        let created = service(users, departments, mailer)
            .create_user(&admin(), create_input(UserRole::Manager, Some(dept)))
            .await
            .unwrap();

        assert_eq!(created.role, UserRole::Manager);
        assert!(created.active);
    }

    #[tokio::test]
    async fn test_create_second_manager_rejected_without_write() {
        let dept = Uuid::new_v4();

        let mut departments = MockDepartmentRepository::new();
        departments
            .expect_find_by_id()
            .returning(|id| Ok(Some(active_department(id))));

        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_find_active_manager()
            .returning(move |_| Ok(Some(user(UserRole::Manager, Some(dept)))));
        users.expect_create().never();

        let mut mailer = MockMailer::new();
        mailer.expect_send_welcome_email().never();

        let result = service(users, departments, mailer)
            .create_user(&admin(), create_input(UserRole::Manager, Some(dept)))
            .await;

        match result {
            Err(AppError::Validation(errors)) => assert!(errors.has_field("role")),
            other => panic!("expected role validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_duplicate_email_rejected() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user(UserRole::User, None))));
        users.expect_create().never();

        let result = service(users, MockDepartmentRepository::new(), MockMailer::new())
            .create_user(&admin(), create_input(UserRole::User, None))
            .await;

        match result {
            Err(AppError::Validation(errors)) => assert!(errors.has_field("email")),
            other => panic!("expected email validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let manager = manager_of(Uuid::new_v4());
        let result = service(
            MockUserRepository::new(),
            MockDepartmentRepository::new(),
            MockMailer::new(),
        )
        .create_user(&manager, create_input(UserRole::User, None))
        .await;

        assert!(matches!(result, Err(AppError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_demoting_manager_releases_pointer() {
        let dept = Uuid::new_v4();
        let existing = user(UserRole::Manager, Some(dept));
        let id = existing.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(existing.clone())));
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_save()
            .withf(move |user, delta| {
                user.role == UserRole::User && delta.release == Some(dept) && delta.assign.is_none()
            })
            .returning(|user, _| Ok(user));

        let updated = service(users, MockDepartmentRepository::new(), MockMailer::new())
            .update_user(
                &admin(),
                id,
                UpdateUser {
                    role: Some(UserRole::User),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_editing_inactive_manager_leaves_pointer_alone() {
        let dept = Uuid::new_v4();
        let mut former = user(UserRole::Manager, Some(dept));
        former.deactivate();
        let id = former.id;
        let current = user(UserRole::Manager, Some(dept));

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(former.clone())));
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_find_active_manager()
            .returning(move |_| Ok(Some(current.clone())));
        users
            .expect_save()
            .withf(|user, delta| user.name == "Old Renamed" && delta.is_empty())
            .times(1)
            .returning(|user, _| Ok(user));

        let updated = service(users, MockDepartmentRepository::new(), MockMailer::new())
            .update_user(
                &admin(),
                id,
                UpdateUser {
                    name: Some("Old Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!updated.active);
        assert_eq!(updated.department_id, Some(dept));
    }

    #[tokio::test]
    async fn test_reactivating_manager_with_active_successor_rejected() {
        let dept = Uuid::new_v4();
        let mut former = user(UserRole::Manager, Some(dept));
        former.deactivate();
        let id = former.id;
        let current = user(UserRole::Manager, Some(dept));

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(former.clone())));
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_find_active_manager()
            .with(eq(dept))
            .returning(move |_| Ok(Some(current.clone())));
        users.expect_save().never();

        let result = service(users, MockDepartmentRepository::new(), MockMailer::new())
            .update_user(
                &admin(),
                id,
                UpdateUser {
                    active: Some(true),
                    ..Default::default()
                },
            )
            .await;

        match result {
            Err(AppError::Validation(errors)) => assert!(errors.has_field("role")),
            other => panic!("expected role validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_deactivate_self_refused() {
        let admin = admin();
        let result = service(
            MockUserRepository::new(),
            MockDepartmentRepository::new(),
            MockMailer::new(),
        )
        .deactivate_user(&admin, admin.id)
        .await;

        assert!(matches!(result, Err(AppError::Dependency(_))));
    }

    #[tokio::test]
    async fn test_deactivate_keeps_record() {
        let target = user(UserRole::User, None);
        let id = target.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(target.clone())));
        users
            .expect_save()
            .withf(|user, delta| !user.active && delta.is_empty())
            .returning(|user, _| Ok(user));

        let result = service(users, MockDepartmentRepository::new(), MockMailer::new())
            .deactivate_user(&admin(), id)
            .await
            .unwrap();

        assert!(!result.active);
    }

    #[tokio::test]
    async fn test_available_users_empty_is_dependency_error() {
        let mut users = MockUserRepository::new();
        users
            .expect_list()
            .withf(|filter| filter.unassigned_only && filter.roles == vec![UserRole::User])
            .returning(|_| Ok(vec![]));

        let result = service(users, MockDepartmentRepository::new(), MockMailer::new())
            .available_users(&manager_of(Uuid::new_v4()))
            .await;

        assert!(matches!(result, Err(AppError::Dependency(_))));
    }

    #[tokio::test]
    async fn test_assign_moves_user_into_manager_department() {
        let dept = Uuid::new_v4();
        let target = user(UserRole::User, None);
        let id = target.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(target.clone())));
        users
            .expect_save()
            .withf(move |user, delta| user.department_id == Some(dept) && delta.is_empty())
            .returning(|user, _| Ok(user));

        let assigned = service(users, MockDepartmentRepository::new(), MockMailer::new())
            .assign_to_department(&manager_of(dept), id)
            .await
            .unwrap();

        assert_eq!(assigned.department_id, Some(dept));
    }

    #[tokio::test]
    async fn test_remove_from_other_department_is_forbidden() {
        let target = user(UserRole::User, Some(Uuid::new_v4()));
        let id = target.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(target.clone())));
        users.expect_save().never();

        let result = service(users, MockDepartmentRepository::new(), MockMailer::new())
            .remove_from_department(&manager_of(Uuid::new_v4()), id)
            .await;

        match result {
            Err(AppError::Forbidden { redirect_to }) => {
                assert_eq!(redirect_to, "/manager/dashboard")
            }
            other => panic!("expected forbidden, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_manager_show_missing_user_is_forbidden() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let result = service(users, MockDepartmentRepository::new(), MockMailer::new())
            .show_user(&manager_of(Uuid::new_v4()), Uuid::new_v4())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden { .. })));
    }
}
