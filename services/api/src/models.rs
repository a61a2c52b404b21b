//! API models for records, request and response payloads

pub mod contact;
pub mod issue;
pub mod stats;
pub mod user;

pub use contact::{ContactMessage, CreateContactRequest, NewContactMessage};
pub use issue::{
    CreateIssueRequest, Issue, IssueCategory, IssueChanges, IssueFilter, IssueQuery, IssueStatus,
    NewIssue, ReporterFilter, UpdateIssueRequest,
};
pub use stats::DashboardStats;
pub use user::{
    CreateAdminRequest, LoginRequest, NewUser, Role, SignupRequest, UpdateAdminRequest, User,
    UserChanges, UserResponse,
};

use serde::Serialize;

/// Plain `{ "message": ... }` acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
