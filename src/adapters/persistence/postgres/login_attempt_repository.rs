//! PostgreSQL implementation of LoginAttemptRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::models::LoginAttemptRecord;
use crate::domain::{LoginAttempt, NewLoginAttempt};
use crate::error::Result;
use crate::ports::LoginAttemptRepository;

/// PostgreSQL login audit trail.
pub struct PgLoginAttemptRepository {
    pool: PgPool,
}

impl PgLoginAttemptRepository {
    /// Create a new [`PgLoginAttemptRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoginAttemptRepository for PgLoginAttemptRepository {
    async fn insert(&self, attempt: &NewLoginAttempt) -> Result<LoginAttempt> {
        let record = sqlx::query_as::<_, LoginAttemptRecord>(
            r#"
            INSERT INTO login_attempts (identity, successful, attempted_at)
            VALUES ($1, $2, $3)
            RETURNING id, identity, successful, attempted_at
            "#,
        )
        .bind(&attempt.identity)
        .bind(attempt.successful)
        .bind(attempt.attempted_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }

    async fn last_successful(
        &self,
        identity: &str,
    ) -> Result<Option<LoginAttempt>> {
        let record = sqlx::query_as::<_, LoginAttemptRecord>(
            r#"
            SELECT id, identity, successful, attempted_at
            FROM login_attempts
            WHERE identity = $1 AND successful
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(LoginAttempt::from))
    }

    async fn recent_failures(
        &self,
        identity: &str,
        after: Option<i64>,
        limit: usize,
    ) -> Result<Vec<LoginAttempt>> {
        let records = sqlx::query_as::<_, LoginAttemptRecord>(
            r#"
            SELECT id, identity, successful, attempted_at
            FROM login_attempts
            WHERE identity = $1
              AND NOT successful
              AND ($2::BIGINT IS NULL OR id > $2)
            ORDER BY id DESC
            LIMIT $3
            "#,
        )
        .bind(identity)
        .bind(after)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(LoginAttempt::from).collect())
    }
}
