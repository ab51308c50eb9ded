//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_departments_table;
mod m20240101_000002_create_users_table;
mod m20240101_000003_create_daily_reports_table;
mod m20240101_000004_add_department_manager;

pub use m20240101_000002_create_users_table::{EMAIL_INDEX, ONE_MANAGER_INDEX};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_departments_table::Migration),
            Box::new(m20240101_000002_create_users_table::Migration),
            Box::new(m20240101_000003_create_daily_reports_table::Migration),
            Box::new(m20240101_000004_add_department_manager::Migration),
        ]
    }
}
