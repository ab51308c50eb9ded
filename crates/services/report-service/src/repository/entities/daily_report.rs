//! Daily report database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DailyReport, ReportStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "daily_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub receiver_id: Option<Uuid>,
    pub report_date: Date,
    #[sea_orm(column_type = "Text")]
    pub planned_tasks: String,
    #[sea_orm(column_type = "Text")]
    pub actual_tasks: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub incomplete_reason: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub next_day_planned_tasks: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub manager_notes: Option<String>,
    pub status: String,
    pub reviewed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DailyReport {
    fn from(model: Model) -> Self {
        DailyReport {
            id: model.id,
            owner_id: model.owner_id,
            receiver_id: model.receiver_id,
            report_date: model.report_date,
            planned_tasks: model.planned_tasks,
            actual_tasks: model.actual_tasks,
            incomplete_reason: model.incomplete_reason,
            next_day_planned_tasks: model.next_day_planned_tasks,
            manager_notes: model.manager_notes,
            status: ReportStatus::parse(&model.status).unwrap_or_default(),
            reviewed_at: model.reviewed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&DailyReport> for ActiveModel {
    fn from(report: &DailyReport) -> Self {
        use sea_orm::Set;

        ActiveModel {
            id: Set(report.id),
            owner_id: Set(report.owner_id),
            receiver_id: Set(report.receiver_id),
            report_date: Set(report.report_date),
            planned_tasks: Set(report.planned_tasks.clone()),
            actual_tasks: Set(report.actual_tasks.clone()),
            incomplete_reason: Set(report.incomplete_reason.clone()),
            next_day_planned_tasks: Set(report.next_day_planned_tasks.clone()),
            manager_notes: Set(report.manager_notes.clone()),
            status: Set(report.status.to_string()),
            reviewed_at: Set(report.reviewed_at),
            created_at: Set(report.created_at),
            updated_at: Set(report.updated_at),
        }
    }
}
