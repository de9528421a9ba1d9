//! Database models for PostgreSQL.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::{LoginAttempt, PastPassword, User};

/// User record as stored in the database.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub identity: String,
    pub full_name: String,
    pub password: String,
    pub enabled: bool,
    pub reset_hash: Option<String>,
    pub reset_requested_at: Option<DateTime<Utc>>,
    pub login_token: Option<String>,
    pub login_token_expiry: Option<DateTime<Utc>>,
    pub last_password_change_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: Some(record.id),
            identity: record.identity,
            full_name: record.full_name,
            password_hash: record.password,
            enabled: record.enabled,
            reset_hash: record.reset_hash,
            reset_requested_at: record.reset_requested_at,
            login_token: record.login_token,
            login_token_expiry: record.login_token_expiry,
            last_password_change_at: record.last_password_change_at,
            created_at: Some(record.created_at),
            updated_at: Some(record.updated_at),
            ..Default::default()
        }
    }
}

/// Past password record.
#[derive(Debug, Clone, FromRow)]
pub struct PastPasswordRecord {
    pub id: i64,
    pub user_id: i64,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl From<PastPasswordRecord> for PastPassword {
    fn from(record: PastPasswordRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            password_hash: record.password,
            created_at: record.created_at,
        }
    }
}

/// Login attempt record.
#[derive(Debug, Clone, FromRow)]
pub struct LoginAttemptRecord {
    pub id: i64,
    pub identity: String,
    pub successful: bool,
    pub attempted_at: DateTime<Utc>,
}

impl From<LoginAttemptRecord> for LoginAttempt {
    fn from(record: LoginAttemptRecord) -> Self {
        Self {
            id: record.id,
            identity: record.identity,
            successful: record.successful,
            attempted_at: record.attempted_at,
        }
    }
}
