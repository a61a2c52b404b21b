//! Issue models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Reporter name used when an anonymous citizen leaves the field blank
pub const DEFAULT_REPORTER: &str = "Citizen X";

/// Image shown for issues submitted without a photo
pub const DEFAULT_IMAGE_URL: &str = "/assets/issues/issue-1.avif";

/// Issue category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueCategory {
    Electrical,
    #[serde(rename = "Water Supply")]
    WaterSupply,
    Roads,
    Waste,
    Safety,
    Others,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 6] = [
        IssueCategory::Electrical,
        IssueCategory::WaterSupply,
        IssueCategory::Roads,
        IssueCategory::Waste,
        IssueCategory::Safety,
        IssueCategory::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Electrical => "Electrical",
            IssueCategory::WaterSupply => "Water Supply",
            IssueCategory::Roads => "Roads",
            IssueCategory::Waste => "Waste",
            IssueCategory::Safety => "Safety",
            IssueCategory::Others => "Others",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown issue category: {}", s))
    }
}

/// Issue workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "Pending",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(IssueStatus::Pending),
            "In Progress" => Ok(IssueStatus::InProgress),
            "Resolved" => Ok(IssueStatus::Resolved),
            other => Err(format!("Unknown issue status: {}", other)),
        }
    }
}

/// Issue record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub description: String,
    pub category: IssueCategory,
    pub status: IssueStatus,
    /// Display name shown next to the issue
    pub reporter: String,
    /// Account that submitted the issue, if the reporter was logged in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_id: Option<Uuid>,
    pub image_url: String,
    /// Submission date as `MM/DD/YYYY`
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated issue ready to be stored
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub location: String,
    pub description: String,
    pub category: IssueCategory,
    pub reporter: String,
    pub reporter_id: Option<Uuid>,
    pub image_url: String,
    pub date: String,
}

/// Partial issue update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct IssueChanges {
    pub title: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub category: Option<IssueCategory>,
    pub status: Option<IssueStatus>,
    pub image_url: Option<String>,
}

/// Request body for submitting an issue
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<IssueCategory>,
    pub reporter: Option<String>,
    pub image_url: Option<String>,
}

/// Request body for editing an issue
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssueRequest {
    pub title: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub category: Option<IssueCategory>,
    pub status: Option<IssueStatus>,
    pub image_url: Option<String>,
}

/// Query parameters for issue listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueQuery {
    /// Reporter display name to match
    pub reporter: Option<String>,
    /// Any non-empty value returns issues NOT reported by `reporter`
    pub exclude: Option<String>,
    pub status: Option<IssueStatus>,
    pub category: Option<IssueCategory>,
    /// Case-insensitive search over title, reporter and category
    pub q: Option<String>,
}

/// Reporter constraint of an issue listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReporterFilter {
    Is(String),
    IsNot(String),
}

/// Repository-level issue filter
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub reporter: Option<ReporterFilter>,
    pub status: Option<IssueStatus>,
    pub category: Option<IssueCategory>,
    pub search: Option<String>,
}

impl From<IssueQuery> for IssueFilter {
    fn from(query: IssueQuery) -> Self {
        let exclude = query.exclude.as_deref().is_some_and(|v| !v.is_empty());

        let reporter = query
            .reporter
            .filter(|r| !r.is_empty())
            .map(|r| {
                if exclude {
                    ReporterFilter::IsNot(r)
                } else {
                    ReporterFilter::Is(r)
                }
            });

        let search = query
            .q
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        Self {
            reporter,
            status: query.status,
            category: query.category,
            search,
        }
    }
}

impl IssueFilter {
    /// Whether an issue satisfies the filter
    pub fn matches(&self, issue: &Issue) -> bool {
        let reporter_ok = match &self.reporter {
            Some(ReporterFilter::Is(name)) => &issue.reporter == name,
            Some(ReporterFilter::IsNot(name)) => &issue.reporter != name,
            None => true,
        };
        let status_ok = self.status.is_none_or(|s| issue.status == s);
        let category_ok = self.category.is_none_or(|c| issue.category == c);
        let search_ok = match &self.search {
            Some(q) => {
                let q = q.to_lowercase();
                issue.title.to_lowercase().contains(&q)
                    || issue.reporter.to_lowercase().contains(&q)
                    || issue.category.as_str().to_lowercase().contains(&q)
            }
            None => true,
        };
        reporter_ok && status_ok && category_ok && search_ok
    }
}

/// Submission date in the `MM/DD/YYYY` form shown on issue cards
pub fn submission_date(now: DateTime<Utc>) -> String {
    now.format("%m/%d/%Y").to_string()
}
