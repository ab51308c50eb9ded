//! Department database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Department;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// Soft delete timestamp (NULL = active, set = deleted)
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Department {
    fn from(model: Model) -> Self {
        Department {
            id: model.id,
            name: model.name,
            description: model.description,
            manager_id: model.manager_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl From<&Department> for ActiveModel {
    fn from(department: &Department) -> Self {
        use sea_orm::Set;

        ActiveModel {
            id: Set(department.id),
            name: Set(department.name.clone()),
            description: Set(department.description.clone()),
            manager_id: Set(department.manager_id),
            created_at: Set(department.created_at),
            updated_at: Set(department.updated_at),
            deleted_at: Set(department.deleted_at),
        }
    }
}
