//! Migration: create daily_reports table.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum DailyReports {
    Table,
    Id,
    OwnerId,
    ReceiverId,
    ReportDate,
    PlannedTasks,
    ActualTasks,
    IncompleteReason,
    NextDayPlannedTasks,
    ManagerNotes,
    Status,
    ReviewedAt,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyReports::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(DailyReports::ReceiverId).uuid().null())
                    .col(ColumnDef::new(DailyReports::ReportDate).date().not_null())
                    .col(ColumnDef::new(DailyReports::PlannedTasks).text().not_null())
                    .col(ColumnDef::new(DailyReports::ActualTasks).text().not_null())
                    .col(ColumnDef::new(DailyReports::IncompleteReason).text().null())
                    .col(
                        ColumnDef::new(DailyReports::NextDayPlannedTasks)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(DailyReports::ManagerNotes).text().null())
                    .col(
                        ColumnDef::new(DailyReports::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(DailyReports::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DailyReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DailyReports::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_reports_owner_id")
                            .from(DailyReports::Table, DailyReports::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_daily_reports_receiver_id")
                            .from(DailyReports::Table, DailyReports::ReceiverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_daily_reports_owner_id_report_date")
                    .table(DailyReports::Table)
                    .col(DailyReports::OwnerId)
                    .col(DailyReports::ReportDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_daily_reports_receiver_id_status")
                    .table(DailyReports::Table)
                    .col(DailyReports::ReceiverId)
                    .col(DailyReports::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyReports::Table).to_owned())
            .await
    }
}
