//! Domain layer - Core business entities and rules.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! roles and accounts, departments, the daily report review lifecycle, the
//! authorization policy and monthly statistics.

pub mod constants;
pub mod daily_report;
pub mod department;
pub mod error;
pub mod password;
pub mod policy;
pub mod stats;
pub mod user;
pub mod validation;

pub use constants::*;
pub use daily_report::{review_status, DailyReport, ReportContent, ReportFilter, ReportStatus};
pub use department::{
    CreateDepartment, Department, DepartmentStatus, DepartmentStatusFilter, SoftDeleteOutcome,
    UpdateDepartment,
};
pub use error::{DomainError, DomainResult};
pub use password::Password;
pub use policy::{Ability, Action, Actor, Resource, Subject};
pub use stats::{
    generate_stats, DepartmentStats, MonthWindow, ReportSummary, StaffMember, StaffStats,
    StatusCounts,
};
pub use user::{
    ensure_single_manager, ActiveFilter, Assignment, CreateUser, ManagerDelta, UpdateUser, User,
    UserFilter, UserResponse, UserRole,
};
pub use validation::{FieldError, ValidationErrors};
