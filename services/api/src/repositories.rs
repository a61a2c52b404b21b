//! Repositories for issue, account and contact records
//!
//! Handlers talk to storage through the traits below. Each has a PostgreSQL
//! implementation and an in-memory one used when no database is configured.

use async_trait::async_trait;
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{
    ContactMessage, Issue, IssueChanges, IssueFilter, NewContactMessage, NewIssue, NewUser, Role,
    User, UserChanges,
};

pub mod contact;
pub mod issue;
pub mod memory;
pub mod user;

pub use contact::PgContactRepository;
pub use issue::PgIssueRepository;
pub use memory::{MemoryContactRepository, MemoryIssueRepository, MemoryUserRepository};
pub use user::PgUserRepository;

/// Storage for reported issues
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Store a new issue with status `Pending`
    async fn create(&self, issue: NewIssue) -> DatabaseResult<Issue>;

    /// Issues matching `filter`, newest first
    async fn list(&self, filter: &IssueFilter) -> DatabaseResult<Vec<Issue>>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Issue>>;

    /// Apply `changes` and bump `updated_at`. `None` when the issue is gone.
    async fn update(&self, id: Uuid, changes: &IssueChanges) -> DatabaseResult<Option<Issue>>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: Uuid) -> DatabaseResult<bool>;
}

/// Storage for user and admin accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert an account. A taken e-mail yields `DatabaseError::UniqueViolation`.
    async fn create(&self, user: NewUser) -> DatabaseResult<User>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    /// Lookup by normalized e-mail
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Accounts holding `role`, newest first
    async fn list_by_role(&self, role: Role) -> DatabaseResult<Vec<User>>;

    async fn count_by_role(&self, role: Role) -> DatabaseResult<i64>;

    async fn update(&self, id: Uuid, changes: &UserChanges) -> DatabaseResult<Option<User>>;

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool>;
}

/// Storage for contact form messages
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, message: NewContactMessage) -> DatabaseResult<ContactMessage>;

    /// All messages, newest first
    async fn list(&self) -> DatabaseResult<Vec<ContactMessage>>;

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool>;

    async fn count(&self) -> DatabaseResult<i64>;
}
