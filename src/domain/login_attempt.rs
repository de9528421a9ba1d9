use chrono::{DateTime, Utc};

/// Audit record of one login attempt, successful or not.
///
/// `id` is a monotonic sequence: attempts are ordered by it, not by
/// `attempted_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginAttempt {
    pub id: i64,
    pub identity: String,
    pub successful: bool,
    pub attempted_at: DateTime<Utc>,
}

/// [`LoginAttempt`] waiting for its id.
#[derive(Debug, Clone)]
pub struct NewLoginAttempt {
    pub identity: String,
    pub successful: bool,
    pub attempted_at: DateTime<Utc>,
}
