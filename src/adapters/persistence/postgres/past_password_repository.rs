//! PostgreSQL implementation of PastPasswordRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::models::PastPasswordRecord;
use crate::domain::{NewPastPassword, PastPassword, UserId};
use crate::error::Result;
use crate::ports::PastPasswordRepository;

/// PostgreSQL password history repository.
pub struct PgPastPasswordRepository {
    pool: PgPool,
}

impl PgPastPasswordRepository {
    /// Create a new [`PgPastPasswordRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PastPasswordRepository for PgPastPasswordRepository {
    async fn recent(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<PastPassword>> {
        let records = sqlx::query_as::<_, PastPasswordRecord>(
            r#"
            SELECT id, user_id, password, created_at
            FROM past_passwords
            WHERE user_id = $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(PastPassword::from).collect())
    }

    async fn prune(&self, user_id: UserId, keep: usize) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM past_passwords
            WHERE user_id = $1
              AND id NOT IN (
                SELECT id FROM past_passwords
                WHERE user_id = $1
                ORDER BY id DESC
                LIMIT $2
              )
            "#,
        )
        .bind(user_id)
        .bind(keep as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert(&self, past: &NewPastPassword) -> Result<PastPassword> {
        let record = sqlx::query_as::<_, PastPasswordRecord>(
            r#"
            INSERT INTO past_passwords (user_id, password, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, password, created_at
            "#,
        )
        .bind(past.user_id)
        .bind(&past.password_hash)
        .bind(past.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }
}
