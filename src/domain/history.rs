use chrono::{DateTime, Utc};

use crate::domain::UserId;

/// Superseded password hash kept to prevent reuse.
#[derive(Clone, PartialEq, Eq)]
pub struct PastPassword {
    pub id: i64,
    pub user_id: UserId,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for PastPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PastPassword")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// [`PastPassword`] waiting for its id.
#[derive(Clone)]
pub struct NewPastPassword {
    pub user_id: UserId,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
