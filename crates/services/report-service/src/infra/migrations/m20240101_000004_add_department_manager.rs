//! Migration: link departments.manager_id to users.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_departments_table::Departments;
use super::m20240101_000002_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

const FK_NAME: &str = "fk_departments_manager_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name(FK_NAME)
                    .from(Departments::Table, Departments::ManagerId)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name(FK_NAME)
                    .table(Departments::Table)
                    .to_owned(),
            )
            .await
    }
}
