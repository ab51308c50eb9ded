//! Daily report entity and its review lifecycle.
//!
//! A report starts `pending`. Only a manager edit of `manager_notes` moves
//! it, and it never returns to `pending`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_LENGTH_REPORT_FIELD, STATUS_COMMENTED, STATUS_PENDING, STATUS_READ};
use crate::error::{DomainError, DomainResult};
use crate::policy::Actor;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Read,
    Commented,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 3] = [
        ReportStatus::Pending,
        ReportStatus::Read,
        ReportStatus::Commented,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => STATUS_PENDING,
            ReportStatus::Read => STATUS_READ,
            ReportStatus::Commented => STATUS_COMMENTED,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            STATUS_PENDING => Some(ReportStatus::Pending),
            STATUS_READ => Some(ReportStatus::Read),
            STATUS_COMMENTED => Some(ReportStatus::Commented),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status produced by a manager saving `new_notes` over `old_notes`.
///
/// Both sides are compared trimmed. Re-saving identical non-empty notes
/// counts as a comment, and the result is never `Pending`.
pub fn review_status(new_notes: Option<&str>, old_notes: Option<&str>) -> ReportStatus {
    let new = new_notes.map(str::trim).unwrap_or_default();
    let old = old_notes.map(str::trim).unwrap_or_default();

    if !new.is_empty() && new != old {
        ReportStatus::Commented
    } else if new.is_empty() && !old.is_empty() {
        ReportStatus::Read
    } else if new == old && !new.is_empty() {
        ReportStatus::Commented
    } else {
        ReportStatus::Read
    }
}

/// Owner-authored fields of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReportContent {
    pub report_date: Option<NaiveDate>,
    pub planned_tasks: String,
    pub actual_tasks: String,
    pub incomplete_reason: Option<String>,
    pub next_day_planned_tasks: Option<String>,
}

impl ReportContent {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.report_date.is_none() {
            errors.add("report_date", "can't be blank");
        }
        errors.check_required("planned_tasks", &self.planned_tasks, MAX_LENGTH_REPORT_FIELD);
        errors.check_required("actual_tasks", &self.actual_tasks, MAX_LENGTH_REPORT_FIELD);
        if let Some(reason) = &self.incomplete_reason {
            errors.check_max_length("incomplete_reason", reason, MAX_LENGTH_REPORT_FIELD);
        }
        if let Some(next) = &self.next_day_planned_tasks {
            errors.check_max_length("next_day_planned_tasks", next, MAX_LENGTH_REPORT_FIELD);
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DailyReport {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Department manager at submission time
    pub receiver_id: Option<Uuid>,
    pub report_date: NaiveDate,
    pub planned_tasks: String,
    pub actual_tasks: String,
    pub incomplete_reason: Option<String>,
    pub next_day_planned_tasks: Option<String>,
    pub manager_notes: Option<String>,
    pub status: ReportStatus,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyReport {
    /// Build a pending report from validated content.
    pub fn submit(
        owner_id: Uuid,
        receiver_id: Option<Uuid>,
        content: ReportContent,
    ) -> DomainResult<Self> {
        content.validate()?;
        let report_date = content
            .report_date
            .ok_or_else(|| DomainError::field("report_date", "can't be blank"))?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            receiver_id,
            report_date,
            planned_tasks: content.planned_tasks,
            actual_tasks: content.actual_tasks,
            incomplete_reason: blank_to_none(content.incomplete_reason),
            next_day_planned_tasks: blank_to_none(content.next_day_planned_tasks),
            manager_notes: None,
            status: ReportStatus::Pending,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == ReportStatus::Pending
    }

    /// Owner edits and deletes are only allowed on the actor's own pending reports.
    pub fn ensure_owner_can_modify(&self, actor: &Actor) -> DomainResult<()> {
        if self.owner_id != actor.id {
            return Err(actor.forbidden());
        }
        if !self.is_pending() {
            return Err(DomainError::dependency(format!(
                "Report has already been {} and can no longer be changed",
                self.status
            )));
        }
        Ok(())
    }

    /// Replace the owner-authored fields.
    pub fn apply_content(&mut self, content: ReportContent, now: DateTime<Utc>) -> DomainResult<()> {
        content.validate()?;
        if let Some(date) = content.report_date {
            self.report_date = date;
        }
        self.planned_tasks = content.planned_tasks;
        self.actual_tasks = content.actual_tasks;
        self.incomplete_reason = blank_to_none(content.incomplete_reason);
        self.next_day_planned_tasks = blank_to_none(content.next_day_planned_tasks);
        self.updated_at = now;
        Ok(())
    }

    /// Manager review: store the trimmed notes and recompute the status.
    pub fn apply_review(&mut self, notes: Option<&str>, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(notes) = notes {
            let mut errors = ValidationErrors::new();
            errors.check_max_length("manager_notes", notes.trim(), MAX_LENGTH_REPORT_FIELD);
            errors.into_result()?;
        }

        let status = review_status(notes, self.manager_notes.as_deref());
        self.manager_notes = notes.map(str::trim).filter(|n| !n.is_empty()).map(String::from);
        self.status = status;
        if status != ReportStatus::Pending {
            self.reviewed_at = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Query over daily reports. Every field narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    /// Limit to these owners; `None` means no owner predicate
    pub owner_ids: Option<Vec<Uuid>>,
    pub owner_id: Option<Uuid>,
    pub report_date: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<ReportStatus>,
    pub receiver_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserRole;

    fn content() -> ReportContent {
        ReportContent {
            report_date: NaiveDate::from_ymd_opt(2024, 5, 2),
            planned_tasks: "Write tests".to_string(),
            actual_tasks: "Wrote tests".to_string(),
            incomplete_reason: None,
            next_day_planned_tasks: Some("Ship".to_string()),
        }
    }

    fn actor(id: Uuid) -> Actor {
        Actor {
            id,
            role: UserRole::User,
            department_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn test_review_status_table() {
        assert_eq!(review_status(Some("Great job"), None), ReportStatus::Commented);
        assert_eq!(review_status(Some("new"), Some("old")), ReportStatus::Commented);
        assert_eq!(review_status(Some(""), Some("old")), ReportStatus::Read);
        assert_eq!(review_status(None, Some("old")), ReportStatus::Read);
        assert_eq!(review_status(Some("same"), Some("same")), ReportStatus::Commented);
        assert_eq!(review_status(Some(""), None), ReportStatus::Read);
        assert_eq!(review_status(Some("   "), Some(" ")), ReportStatus::Read);
    }

    #[test]
    fn test_review_status_compares_trimmed() {
        assert_eq!(review_status(Some(" ok "), Some("ok")), ReportStatus::Commented);
        assert_eq!(review_status(Some("  "), Some("ok")), ReportStatus::Read);
    }

    #[test]
    fn test_submit_is_pending() {
        let report = DailyReport::submit(Uuid::new_v4(), None, content()).unwrap();
        assert_eq!(report.status, ReportStatus::Pending);
        assert!(report.reviewed_at.is_none());
        assert!(report.manager_notes.is_none());
    }

    #[test]
    fn test_submit_reports_all_missing_fields() {
        let result = DailyReport::submit(Uuid::new_v4(), None, ReportContent::default());
        match result {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.has_field("report_date"));
                assert!(errors.has_field("planned_tasks"));
                assert!(errors.has_field("actual_tasks"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_comment_then_clear_scenario() {
        let mut report = DailyReport::submit(Uuid::new_v4(), None, content()).unwrap();

        report.apply_review(Some("Great job"), Utc::now()).unwrap();
        assert_eq!(report.status, ReportStatus::Commented);
        assert_eq!(report.manager_notes.as_deref(), Some("Great job"));
        let first_review = report.reviewed_at.expect("reviewed_at stamped");

        report.apply_review(Some(""), Utc::now()).unwrap();
        assert_eq!(report.status, ReportStatus::Read);
        assert_eq!(report.manager_notes, None);
        assert!(report.reviewed_at.unwrap() >= first_review);
    }

    #[test]
    fn test_resaving_same_notes_refreshes_reviewed_at() {
        let mut report = DailyReport::submit(Uuid::new_v4(), None, content()).unwrap();
        let earlier = Utc::now() - chrono::Duration::hours(1);
        report.apply_review(Some("Noted"), earlier).unwrap();

        let later = Utc::now();
        report.apply_review(Some(" Noted "), later).unwrap();
        assert_eq!(report.status, ReportStatus::Commented);
        assert_eq!(report.reviewed_at, Some(later));
    }

    #[test]
    fn test_owner_cannot_modify_reviewed_report() {
        let owner = Uuid::new_v4();
        let mut report = DailyReport::submit(owner, None, content()).unwrap();
        assert!(report.ensure_owner_can_modify(&actor(owner)).is_ok());

        report.apply_review(None, Utc::now()).unwrap();
        assert!(matches!(
            report.ensure_owner_can_modify(&actor(owner)),
            Err(DomainError::Dependency(_))
        ));
    }

    #[test]
    fn test_other_user_cannot_modify() {
        let report = DailyReport::submit(Uuid::new_v4(), None, content()).unwrap();
        assert!(matches!(
            report.ensure_owner_can_modify(&actor(Uuid::new_v4())),
            Err(DomainError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_apply_content_drops_blank_optional_fields() {
        let mut report = DailyReport::submit(Uuid::new_v4(), None, content()).unwrap();
        let mut edit = content();
        edit.next_day_planned_tasks = Some("  ".to_string());
        report.apply_content(edit, Utc::now()).unwrap();
        assert_eq!(report.next_day_planned_tasks, None);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ReportStatus::parse("read"), Some(ReportStatus::Read));
        assert_eq!(ReportStatus::parse("done"), None);
    }
}
