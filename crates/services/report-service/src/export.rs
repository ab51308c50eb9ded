//! CSV export of department reports.

use common::{AppError, AppResult};
use domain::ReportFilter;

use crate::service::OwnedReport;

pub const NO_DATE_SELECTED: &str = "Please select a report date before exporting.";
pub const NO_MATCHING_REPORTS: &str = "No reports match the selected filters.";

const HEADER: [&str; 9] = [
    "owner",
    "report_date",
    "planned_tasks",
    "actual_tasks",
    "incomplete_reason",
    "next_day_planned_tasks",
    "status",
    "manager_notes",
    "reviewed_at",
];

/// Exports are always scoped to a chosen report date.
pub fn ensure_date_selected(filter: &ReportFilter) -> AppResult<()> {
    if filter.report_date.is_none() {
        return Err(AppError::bad_request(NO_DATE_SELECTED));
    }
    Ok(())
}

/// Render the rows as CSV, refusing an empty export.
pub fn reports_csv(rows: &[OwnedReport]) -> AppResult<Vec<u8>> {
    if rows.is_empty() {
        return Err(AppError::bad_request(NO_MATCHING_REPORTS));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER).map_err(csv_error)?;

    for row in rows {
        let report = &row.report;
        let report_date = report.report_date.to_string();
        let reviewed_at = report
            .reviewed_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        writer
            .write_record([
                row.owner_name.as_str(),
                report_date.as_str(),
                report.planned_tasks.as_str(),
                report.actual_tasks.as_str(),
                report.incomplete_reason.as_deref().unwrap_or(""),
                report.next_day_planned_tasks.as_deref().unwrap_or(""),
                report.status.as_str(),
                report.manager_notes.as_deref().unwrap_or(""),
                reviewed_at.as_str(),
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("CSV flush failed: {}", e)))
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::internal(format!("CSV write failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::{DailyReport, ReportContent};
    use uuid::Uuid;

    fn row(planned: &str) -> OwnedReport {
        let report = DailyReport::submit(
            Uuid::new_v4(),
            None,
            ReportContent {
                report_date: NaiveDate::from_ymd_opt(2024, 5, 2),
                planned_tasks: planned.to_string(),
                actual_tasks: "Done".to_string(),
                incomplete_reason: None,
                next_day_planned_tasks: None,
            },
        )
        .unwrap();

        OwnedReport {
            report,
            owner_name: "Ann".to_string(),
            owner_email: "ann@example.com".to_string(),
        }
    }

    #[test]
    fn test_missing_date_and_empty_result_are_distinct() {
        let no_date = ensure_date_selected(&ReportFilter::default()).unwrap_err();
        let empty = reports_csv(&[]).unwrap_err();

        assert_eq!(no_date.user_message(), NO_DATE_SELECTED);
        assert_eq!(empty.user_message(), NO_MATCHING_REPORTS);
    }

    #[test]
    fn test_csv_has_header_and_quotes_fields() {
        let bytes = reports_csv(&[row("Call, then email")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("owner,report_date,planned_tasks,actual_tasks,incomplete_reason,next_day_planned_tasks,status,manager_notes,reviewed_at")
        );
        assert_eq!(
            lines.next(),
            Some("Ann,2024-05-02,\"Call, then email\",Done,,,pending,,")
        );
    }
}
