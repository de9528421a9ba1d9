//! Durable store ports.
//!
//! Implementations must enforce uniqueness of `identity` among enabled users
//! and of `reset_hash`, reporting conflicts as
//! [`Error::UniqueViolation`](crate::error::Error::UniqueViolation).

use async_trait::async_trait;

use crate::domain::{
    LoginAttempt, NewLoginAttempt, NewPastPassword, PastPassword, User,
    UserId,
};
use crate::error::Result;

/// Constraint name reported when two enabled users share an identity.
pub const IDENTITY_CONSTRAINT: &str = "users_identity_enabled_key";
/// Constraint name reported when two users share a reset hash.
pub const RESET_HASH_CONSTRAINT: &str = "users_reset_hash_key";

/// Port for user persistence operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by its ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Find an enabled user by identity.
    async fn find_by_identity(&self, identity: &str) -> Result<Option<User>>;

    /// Find a user holding `reset_hash`.
    async fn find_by_reset_hash(&self, reset_hash: &str)
    -> Result<Option<User>>;

    /// Whether another enabled user already uses `identity`.
    async fn identity_taken(
        &self,
        identity: &str,
        exclude: Option<UserId>,
    ) -> Result<bool>;

    /// Insert a new user and return its assigned ID.
    async fn insert(&self, user: &User) -> Result<UserId>;

    /// Update an existing user.
    async fn update(&self, user: &User) -> Result<()>;
}

/// Port for password history persistence.
#[async_trait]
pub trait PastPasswordRepository: Send + Sync {
    /// Newest-first past passwords of a user, at most `limit`.
    async fn recent(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<PastPassword>>;

    /// Delete all but the `keep` newest entries. Returns deleted count.
    async fn prune(&self, user_id: UserId, keep: usize) -> Result<u64>;

    /// Append a past password.
    async fn insert(&self, past: &NewPastPassword) -> Result<PastPassword>;
}

/// Port for the login audit trail.
#[async_trait]
pub trait LoginAttemptRepository: Send + Sync {
    /// Append an attempt.
    async fn insert(&self, attempt: &NewLoginAttempt) -> Result<LoginAttempt>;

    /// Latest successful attempt for `identity`.
    async fn last_successful(
        &self,
        identity: &str,
    ) -> Result<Option<LoginAttempt>>;

    /// Newest-first failed attempts for `identity` with an id strictly
    /// greater than `after`, at most `limit`.
    async fn recent_failures(
        &self,
        identity: &str,
        after: Option<i64>,
        limit: usize,
    ) -> Result<Vec<LoginAttempt>>;
}
