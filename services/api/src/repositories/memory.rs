//! In-memory repositories
//!
//! Used when `DATABASE_URL` is not set and by the test suite. Records live
//! only as long as the process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContactRepository, IssueRepository, UserRepository};
use crate::models::{
    ContactMessage, Issue, IssueChanges, IssueFilter, IssueStatus, NewContactMessage, NewIssue,
    NewUser, Role, User, UserChanges,
};

/// Name reported for e-mail collisions, matching the database constraint
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Newest first; ties keep the most recent insertion first
fn newest_first<T: Clone>(records: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = records.iter().rev().cloned().collect();
    out.sort_by_key(|r| std::cmp::Reverse(created_at(r)));
    out
}

#[derive(Clone, Default)]
pub struct MemoryIssueRepository {
    issues: Arc<RwLock<Vec<Issue>>>,
}

impl MemoryIssueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IssueRepository for MemoryIssueRepository {
    async fn create(&self, issue: NewIssue) -> DatabaseResult<Issue> {
        let now = Utc::now();
        let issue = Issue {
            id: Uuid::new_v4(),
            title: issue.title,
            location: issue.location,
            description: issue.description,
            category: issue.category,
            status: IssueStatus::Pending,
            reporter: issue.reporter,
            reporter_id: issue.reporter_id,
            image_url: issue.image_url,
            date: issue.date,
            created_at: now,
            updated_at: now,
        };

        self.issues.write().await.push(issue.clone());
        Ok(issue)
    }

    async fn list(&self, filter: &IssueFilter) -> DatabaseResult<Vec<Issue>> {
        let issues = self.issues.read().await;
        let mut matching = newest_first(issues.as_slice(), |i| i.created_at);
        matching.retain(|i| filter.matches(i));
        Ok(matching)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Issue>> {
        Ok(self.issues.read().await.iter().find(|i| i.id == id).cloned())
    }

    async fn update(&self, id: Uuid, changes: &IssueChanges) -> DatabaseResult<Option<Issue>> {
        let mut issues = self.issues.write().await;
        let Some(issue) = issues.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };

        if let Some(title) = &changes.title {
            issue.title = title.clone();
        }
        if let Some(location) = &changes.location {
            issue.location = location.clone();
        }
        if let Some(description) = &changes.description {
            issue.description = description.clone();
        }
        if let Some(category) = changes.category {
            issue.category = category;
        }
        if let Some(status) = changes.status {
            issue.status = status;
        }
        if let Some(image_url) = &changes.image_url {
            issue.image_url = image_url.clone();
        }
        issue.updated_at = Utc::now();

        Ok(Some(issue.clone()))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut issues = self.issues.write().await;
        let before = issues.len();
        issues.retain(|i| i.id != id);
        Ok(issues.len() < before)
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> DatabaseResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::UniqueViolation(EMAIL_CONSTRAINT.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_by_role(&self, role: Role) -> DatabaseResult<Vec<User>> {
        let users = self.users.read().await;
        let mut matching = newest_first(users.as_slice(), |u| u.created_at);
        matching.retain(|u| u.role == role);
        Ok(matching)
    }

    async fn count_by_role(&self, role: Role) -> DatabaseResult<i64> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| u.role == role).count() as i64)
    }

    async fn update(&self, id: Uuid, changes: &UserChanges) -> DatabaseResult<Option<User>> {
        let mut users = self.users.write().await;

        if let Some(email) = &changes.email {
            if users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(DatabaseError::UniqueViolation(EMAIL_CONSTRAINT.to_string()));
            }
        }

        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(password_hash) = &changes.password_hash {
            user.password_hash = password_hash.clone();
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[derive(Clone, Default)]
pub struct MemoryContactRepository {
    messages: Arc<RwLock<Vec<ContactMessage>>>,
}

impl MemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for MemoryContactRepository {
    async fn create(&self, message: NewContactMessage) -> DatabaseResult<ContactMessage> {
        let message = ContactMessage {
            id: Uuid::new_v4(),
            first_name: message.first_name,
            last_name: message.last_name,
            message: message.message,
            created_at: Utc::now(),
        };
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn list(&self) -> DatabaseResult<Vec<ContactMessage>> {
        let messages = self.messages.read().await;
        Ok(newest_first(messages.as_slice(), |m| m.created_at))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut messages = self.messages.write().await;
        let before = messages.len();
        messages.retain(|m| m.id != id);
        Ok(messages.len() < before)
    }

    async fn count(&self) -> DatabaseResult<i64> {
        Ok(self.messages.read().await.len() as i64)
    }
}
