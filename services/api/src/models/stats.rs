//! Dashboard statistics

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::issue::{Issue, IssueCategory, IssueStatus};

/// Issue counts per workflow status
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub pending: u64,
    pub in_progress: u64,
    pub resolved: u64,
}

/// Aggregated figures for the admin dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub admin_count: i64,
    pub contact_count: i64,
    pub total_issues: u64,
    pub by_status: StatusBreakdown,
    pub by_category: BTreeMap<IssueCategory, u64>,
    /// Resolved issues last touched in the current calendar month
    pub resolved_this_month: u64,
}

impl DashboardStats {
    pub fn from_issues(
        issues: &[Issue],
        admin_count: i64,
        contact_count: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let mut by_status = StatusBreakdown::default();
        let mut by_category: BTreeMap<IssueCategory, u64> =
            IssueCategory::ALL.into_iter().map(|c| (c, 0)).collect();
        let mut resolved_this_month = 0;

        for issue in issues {
            match issue.status {
                IssueStatus::Pending => by_status.pending += 1,
                IssueStatus::InProgress => by_status.in_progress += 1,
                IssueStatus::Resolved => {
                    by_status.resolved += 1;
                    if issue.updated_at.year() == now.year()
                        && issue.updated_at.month() == now.month()
                    {
                        resolved_this_month += 1;
                    }
                }
            }
            *by_category.entry(issue.category).or_default() += 1;
        }

        Self {
            admin_count,
            contact_count,
            total_issues: issues.len() as u64,
            by_status,
            by_category,
            resolved_this_month,
        }
    }
}
