//! SeaORM entities.

pub mod daily_report;
pub mod department;
pub mod user;
