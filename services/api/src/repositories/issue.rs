//! PostgreSQL issue repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use super::IssueRepository;
use crate::models::{Issue, IssueChanges, IssueFilter, IssueStatus, NewIssue, ReporterFilter};

const ISSUE_COLUMNS: &str = "id, title, location, description, category, status, reporter, \
     reporter_id, image_url, date, created_at, updated_at";

/// Issue repository backed by the `issues` table
#[derive(Clone)]
pub struct PgIssueRepository {
    pool: PgPool,
}

impl PgIssueRepository {
    /// Create a new issue repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_issue(row: &PgRow) -> DatabaseResult<Issue> {
    let category: String = row.get("category");
    let status: String = row.get("status");

    Ok(Issue {
        id: row.get("id"),
        title: row.get("title"),
        location: row.get("location"),
        description: row.get("description"),
        category: category.parse().map_err(DatabaseError::Decode)?,
        status: status.parse().map_err(DatabaseError::Decode)?,
        reporter: row.get("reporter"),
        reporter_id: row.get("reporter_id"),
        image_url: row.get("image_url"),
        date: row.get("date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Escape LIKE wildcards so the search term matches literally
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl IssueRepository for PgIssueRepository {
    async fn create(&self, issue: NewIssue) -> DatabaseResult<Issue> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO issues (id, title, location, description, category, status,
                                reporter, reporter_id, image_url, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ISSUE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&issue.title)
        .bind(&issue.location)
        .bind(&issue.description)
        .bind(issue.category.as_str())
        .bind(IssueStatus::Pending.as_str())
        .bind(&issue.reporter)
        .bind(issue.reporter_id)
        .bind(&issue.image_url)
        .bind(&issue.date)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row_to_issue(&row)
    }

    async fn list(&self, filter: &IssueFilter) -> DatabaseResult<Vec<Issue>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE TRUE"));

        match &filter.reporter {
            Some(ReporterFilter::Is(name)) => {
                query.push(" AND reporter = ").push_bind(name.clone());
            }
            Some(ReporterFilter::IsNot(name)) => {
                query.push(" AND reporter <> ").push_bind(name.clone());
            }
            None => {}
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(category) = filter.category {
            query.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(term) = &filter.search {
            let pattern = like_pattern(term);
            query
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR reporter ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR category ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        rows.iter().map(row_to_issue).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Issue>> {
        let row = sqlx::query(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref().map(row_to_issue).transpose()
    }

    async fn update(&self, id: Uuid, changes: &IssueChanges) -> DatabaseResult<Option<Issue>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE issues
            SET title = COALESCE($2, title),
                location = COALESCE($3, location),
                description = COALESCE($4, description),
                category = COALESCE($5, category),
                status = COALESCE($6, status),
                image_url = COALESCE($7, image_url),
                updated_at = now()
            WHERE id = $1
            RETURNING {ISSUE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.location.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.category.map(|c| c.as_str()))
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.image_url.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref().map(row_to_issue).transpose()
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }
}
