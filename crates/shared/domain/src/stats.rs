//! Monthly per-staff report statistics.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::daily_report::ReportStatus;

/// Report counts of one staff member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatusCounts {
    pub total: u32,
    pub pending: u32,
    pub read: u32,
    pub commented: u32,
}

impl StatusCounts {
    pub fn record(&mut self, status: ReportStatus) {
        self.total += 1;
        match status {
            ReportStatus::Pending => self.pending += 1,
            ReportStatus::Read => self.read += 1,
            ReportStatus::Commented => self.commented += 1,
        }
    }
}

/// Inclusive calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthWindow {
    /// The month containing `day`.
    pub fn current(day: NaiveDate) -> Self {
        let start = day.with_day(1).unwrap_or(day);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(start);
        Self { start, end }
    }

    /// The calendar month before the one containing `today`.
    pub fn previous(today: NaiveDate) -> Self {
        let this_month = Self::current(today);
        let last_day = this_month.start.pred_opt().unwrap_or(this_month.start);
        Self::current(last_day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// "May 2024"
    pub fn label(&self) -> String {
        self.start.format("%B %Y").to_string()
    }
}

/// The attributes of a report the aggregation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub owner_id: Uuid,
    pub report_date: NaiveDate,
    pub status: ReportStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StaffStats {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentStats {
    pub window: MonthWindow,
    /// One entry per staff member, in the order given
    pub staff: Vec<StaffStats>,
}

impl DepartmentStats {
    pub fn totals(&self) -> StatusCounts {
        self.staff.iter().fold(StatusCounts::default(), |mut acc, s| {
            acc.total += s.counts.total;
            acc.pending += s.counts.pending;
            acc.read += s.counts.read;
            acc.commented += s.counts.commented;
            acc
        })
    }
}

/// A member taken into account by the aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffMember {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Count reports by status for every staff member within `window`.
///
/// Members without reports get zeroed counts. Reports of anyone not in
/// `staff`, or dated outside the window, are ignored.
pub fn generate_stats(
    staff: &[StaffMember],
    reports: &[ReportSummary],
    window: MonthWindow,
) -> DepartmentStats {
    let mut counts: HashMap<Uuid, StatusCounts> = staff
        .iter()
        .map(|member| (member.id, StatusCounts::default()))
        .collect();

    for report in reports.iter().filter(|r| window.contains(r.report_date)) {
        if let Some(entry) = counts.get_mut(&report.owner_id) {
            entry.record(report.status);
        }
    }

    let staff = staff
        .iter()
        .map(|member| StaffStats {
            user_id: member.id,
            name: member.name.clone(),
            email: member.email.clone(),
            counts: counts.get(&member.id).copied().unwrap_or_default(),
        })
        .collect();

    DepartmentStats { window, staff }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member(name: &str) -> StaffMember {
        StaffMember {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name),
        }
    }

    #[test]
    fn test_previous_month_window() {
        let window = MonthWindow::previous(date(2024, 3, 15));
        assert_eq!(window.start, date(2024, 2, 1));
        assert_eq!(window.end, date(2024, 2, 29));

        let january = MonthWindow::previous(date(2024, 1, 1));
        assert_eq!(january.start, date(2023, 12, 1));
        assert_eq!(january.end, date(2023, 12, 31));
        assert_eq!(january.label(), "December 2023");
    }

    #[test]
    fn test_current_month_window() {
        let window = MonthWindow::current(date(2024, 4, 30));
        assert_eq!(window.start, date(2024, 4, 1));
        assert_eq!(window.end, date(2024, 4, 30));
        assert!(window.contains(date(2024, 4, 1)));
        assert!(!window.contains(date(2024, 5, 1)));
    }

    #[test]
    fn test_zero_reports_yields_zeroed_entries() {
        let staff = vec![member("a"), member("b"), member("c")];
        let stats = generate_stats(&staff, &[], MonthWindow::previous(date(2024, 6, 1)));

        assert_eq!(stats.staff.len(), 3);
        assert!(stats
            .staff
            .iter()
            .all(|s| s.counts == StatusCounts::default()));
    }

    #[test]
    fn test_counts_by_status_within_window() {
        let staff = vec![member("a"), member("b")];
        let window = MonthWindow::previous(date(2024, 6, 10));
        let a = staff[0].id;
        let reports = vec![
            ReportSummary {
                owner_id: a,
                report_date: date(2024, 5, 2),
                status: ReportStatus::Pending,
            },
            ReportSummary {
                owner_id: a,
                report_date: date(2024, 5, 3),
                status: ReportStatus::Commented,
            },
            ReportSummary {
                owner_id: a,
                report_date: date(2024, 6, 1),
                status: ReportStatus::Read,
            },
            ReportSummary {
                owner_id: Uuid::new_v4(),
                report_date: date(2024, 5, 3),
                status: ReportStatus::Read,
            },
        ];

        let stats = generate_stats(&staff, &reports, window);
        assert_eq!(stats.staff[0].user_id, a);
        assert_eq!(
            stats.staff[0].counts,
            StatusCounts {
                total: 2,
                pending: 1,
                read: 0,
                commented: 1
            }
        );
        assert_eq!(stats.staff[1].counts.total, 0);
        assert_eq!(stats.totals().total, 2);
    }
}
