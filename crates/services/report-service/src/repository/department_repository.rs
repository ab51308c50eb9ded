//! Department repository implementation with soft delete support.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select,
};
use uuid::Uuid;

use super::entities::department::{self, ActiveModel, Entity as DepartmentEntity};
use common::{AppError, AppResult};
use domain::{Department, DepartmentStatusFilter};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Department repository trait for dependency injection.
///
/// Every listing takes an explicit status filter; lookups by id return
/// deleted departments too so callers can restore them.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// Find department by ID, deleted or not
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Department>>;

    /// List departments by status, ordered by name
    async fn list(&self, status: DepartmentStatusFilter) -> AppResult<Vec<Department>>;

    /// Count departments by status
    async fn count(&self, status: DepartmentStatusFilter) -> AppResult<u64>;

    /// Insert a new department
    async fn create(&self, department: Department) -> AppResult<Department>;

    /// Persist name, description and deletion state.
    ///
    /// The manager pointer is owned by user saves and is never written here.
    async fn save(&self, department: Department) -> AppResult<Department>;
}

/// Concrete implementation of DepartmentRepository with soft delete
pub struct DepartmentStore {
    db: DatabaseConnection,
}

impl DepartmentStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn by_status(status: DepartmentStatusFilter) -> Select<DepartmentEntity> {
    let query = DepartmentEntity::find();
    match status {
        DepartmentStatusFilter::All => query,
        DepartmentStatusFilter::Active => query.filter(department::Column::DeletedAt.is_null()),
        DepartmentStatusFilter::Deleted => {
            query.filter(department::Column::DeletedAt.is_not_null())
        }
    }
}

#[async_trait]
impl DepartmentRepository for DepartmentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Department>> {
        let result = DepartmentEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Department::from))
    }

    async fn list(&self, status: DepartmentStatusFilter) -> AppResult<Vec<Department>> {
        let models = by_status(status)
            .order_by_asc(department::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Department::from).collect())
    }

    async fn count(&self, status: DepartmentStatusFilter) -> AppResult<u64> {
        by_status(status)
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn create(&self, department: Department) -> AppResult<Department> {
        let model = ActiveModel::from(&department)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Department::from(model))
    }

    async fn save(&self, mut department: Department) -> AppResult<Department> {
        department.updated_at = Utc::now();

        let mut active = ActiveModel::from(&department);
        active.manager_id = NotSet;

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Department::from(model))
    }
}
