//! PostgreSQL contact message repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::ContactRepository;
use crate::models::{ContactMessage, NewContactMessage};

#[derive(Clone)]
pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_message(row: &PgRow) -> ContactMessage {
    ContactMessage {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        message: row.get("message"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn create(&self, message: NewContactMessage) -> DatabaseResult<ContactMessage> {
        let row = sqlx::query(
            r#"
            INSERT INTO contact_messages (id, first_name, last_name, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, message, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&message.first_name)
        .bind(&message.last_name)
        .bind(&message.message)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row_to_message(&row))
    }

    async fn list(&self) -> DatabaseResult<Vec<ContactMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, first_name, last_name, message, created_at
            FROM contact_messages
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows.iter().map(row_to_message).collect())
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> DatabaseResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }
}
