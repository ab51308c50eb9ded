//! Repository layer for data access.

mod daily_report_repository;
mod department_repository;
pub mod entities;
mod user_repository;

pub use daily_report_repository::{DailyReportRepository, DailyReportStore};
pub use department_repository::{DepartmentRepository, DepartmentStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use daily_report_repository::MockDailyReportRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use department_repository::MockDepartmentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
