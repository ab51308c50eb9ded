//! Plain text email templates.

use domain::{DailyReport, Department, DepartmentStats, User};

/// Rendered message ready to be queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub fn welcome_email(user: &User, password: &str) -> RenderedEmail {
    RenderedEmail {
        to: user.email.clone(),
        subject: "Welcome to Daily Report".to_string(),
        body: format!(
            "Hello {name},\n\n\
             An account has been created for you.\n\n\
             Email: {email}\n\
             Password: {password}\n\n\
             Please sign in and change your password.",
            name = user.name,
            email = user.email,
            password = password,
        ),
    }
}

pub fn manager_notification(report: &DailyReport, owner: &User, manager: &User) -> RenderedEmail {
    RenderedEmail {
        to: manager.email.clone(),
        subject: format!(
            "New daily report from {} for {}",
            owner.name, report.report_date
        ),
        body: format!(
            "Hello {manager},\n\n\
             {owner} submitted a daily report for {date}.\n\n\
             Planned tasks:\n{planned}\n\n\
             Actual tasks:\n{actual}\n",
            manager = manager.name,
            owner = owner.name,
            date = report.report_date,
            planned = report.planned_tasks,
            actual = report.actual_tasks,
        ),
    }
}

pub fn monthly_stats(manager: &User, department: &Department, stats: &DepartmentStats) -> RenderedEmail {
    let month = stats.window.label();
    let mut body = format!(
        "Hello {},\n\nDaily report statistics of {} for {}:\n\n",
        manager.name, department.name, month
    );

    if stats.staff.is_empty() {
        body.push_str("No staff members in this department.\n");
    } else {
        body.push_str("Name | Total | Pending | Read | Commented\n");
        for entry in &stats.staff {
            body.push_str(&format!(
                "{} | {} | {} | {} | {}\n",
                entry.name,
                entry.counts.total,
                entry.counts.pending,
                entry.counts.read,
                entry.counts.commented
            ));
        }
        let totals = stats.totals();
        body.push_str(&format!(
            "Total | {} | {} | {} | {}\n",
            totals.total, totals.pending, totals.read, totals.commented
        ));
    }

    RenderedEmail {
        to: manager.email.clone(),
        subject: format!("Monthly report statistics {} - {}", month, department.name),
        body,
    }
}
