//! User repository implementation.
//!
//! Saving a user and moving the department manager pointer happen in one
//! transaction: the user row first, then `ManagerDelta::release`, then
//! `ManagerDelta::assign`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use super::entities::department::{self, Entity as DepartmentEntity};
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::infra::migrations::{EMAIL_INDEX, ONE_MANAGER_INDEX};
use common::{AppError, AppResult};
use domain::{ManagerDelta, User, UserFilter, UserRole};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by email address (case-insensitive)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find the active manager assigned to a department
    async fn find_active_manager(&self, department_id: Uuid) -> AppResult<Option<User>>;

    /// List users matching the filter, ordered by name
    async fn list(&self, filter: UserFilter) -> AppResult<Vec<User>>;

    /// Count users matching the filter
    async fn count(&self, filter: UserFilter) -> AppResult<u64>;

    /// Insert a new user and apply the manager pointer changes
    async fn create(&self, user: User, delta: ManagerDelta) -> AppResult<User>;

    /// Update an existing user and apply the manager pointer changes
    async fn save(&self, user: User, delta: ManagerDelta) -> AppResult<User>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn apply_filter<Q: QueryFilter>(mut query: Q, filter: &UserFilter) -> Q {
    if let Some(name) = filter.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col(user::Column::Name)))
                .like(format!("%{}%", name.to_lowercase())),
        );
    }
    if let Some(email) = filter.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        query = query.filter(user::Column::Email.contains(email.to_lowercase()));
    }
    if let Some(active) = filter.active.as_flag() {
        query = query.filter(user::Column::Active.eq(active));
    }
    if let Some(department_id) = filter.department_id {
        query = query.filter(user::Column::DepartmentId.eq(department_id));
    }
    if filter.unassigned_only {
        query = query.filter(user::Column::DepartmentId.is_null());
    }
    if !filter.roles.is_empty() {
        query = query.filter(
            user::Column::Role.is_in(filter.roles.iter().map(UserRole::to_string)),
        );
    }
    query
}

/// Translate unique index violations into field errors.
fn map_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            unique_violation_error(&detail).unwrap_or_else(|| AppError::from(err))
        }
        _ => AppError::from(err),
    }
}

/// Field error for a violated index named in the database message.
fn unique_violation_error(detail: &str) -> Option<AppError> {
    if detail.contains(ONE_MANAGER_INDEX) {
        Some(AppError::field("role", "department already has a manager"))
    } else if detail.contains(EMAIL_INDEX) {
        Some(AppError::field("email", "has already been taken"))
    } else {
        None
    }
}

async fn apply_manager_delta<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    delta: ManagerDelta,
) -> AppResult<()> {
    let now = Utc::now();

    if let Some(department_id) = delta.release {
        // Only clear a pointer that still references this user
        let result = DepartmentEntity::update_many()
            .col_expr(department::Column::ManagerId, Expr::value(Option::<Uuid>::None))
            .col_expr(department::Column::UpdatedAt, Expr::value(now))
            .filter(department::Column::Id.eq(department_id))
            .filter(department::Column::ManagerId.eq(user_id))
            .exec(conn)
            .await?;
        tracing::debug!(
            %user_id,
            %department_id,
            released = result.rows_affected,
            "Released department manager"
        );
    }

    if let Some(department_id) = delta.assign {
        DepartmentEntity::update_many()
            .col_expr(department::Column::ManagerId, Expr::value(Some(user_id)))
            .col_expr(department::Column::UpdatedAt, Expr::value(now))
            .filter(department::Column::Id.eq(department_id))
            .exec(conn)
            .await?;
        tracing::info!(%user_id, %department_id, "Assigned department manager");
    }

    Ok(())
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_active_manager(&self, department_id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::DepartmentId.eq(department_id))
            .filter(user::Column::Role.eq(UserRole::Manager.as_str()))
            .filter(user::Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn list(&self, filter: UserFilter) -> AppResult<Vec<User>> {
        let models = apply_filter(UserEntity::find(), &filter)
            .order_by_asc(user::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn count(&self, filter: UserFilter) -> AppResult<u64> {
        apply_filter(UserEntity::find(), &filter)
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn create(&self, user: User, delta: ManagerDelta) -> AppResult<User> {
        let txn = self.db.begin().await?;

        let model = ActiveModel::from(&user)
            .insert(&txn)
            .await
            .map_err(map_write_error)?;
        apply_manager_delta(&txn, model.id, delta).await?;

        txn.commit().await?;
        Ok(User::from(model))
    }

    async fn save(&self, mut user: User, delta: ManagerDelta) -> AppResult<User> {
        user.updated_at = Utc::now();
        let txn = self.db.begin().await?;

        let model = ActiveModel::from(&user)
            .update(&txn)
            .await
            .map_err(map_write_error)?;
        apply_manager_delta(&txn, model.id, delta).await?;

        txn.commit().await?;
        Ok(User::from(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(error: AppError) -> String {
        match error {
            AppError::Validation(errors) => errors.errors()[0].field.clone(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_concurrent_second_manager_becomes_role_error() {
        let detail = format!(
            "duplicate key value violates unique constraint \"{}\"",
            ONE_MANAGER_INDEX
        );
        let error = unique_violation_error(&detail).unwrap();
        assert_eq!(field_of(error), "role");
    }

    #[test]
    fn test_duplicate_email_becomes_email_error() {
        let detail = format!(
            "duplicate key value violates unique constraint \"{}\"",
            EMAIL_INDEX
        );
        let error = unique_violation_error(&detail).unwrap();
        assert_eq!(field_of(error), "email");
    }

    #[test]
    fn test_unknown_index_is_not_translated() {
        assert!(unique_violation_error("duplicate key value violates unique constraint \"other\"").is_none());
    }
}
