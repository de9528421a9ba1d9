//! In-process store implementing every repository port.
//!
//! Enforces the same uniqueness rules as the PostgreSQL schema. Useful for
//! tests and for embedding without a database.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    LoginAttempt, NewLoginAttempt, NewPastPassword, PastPassword, User,
    UserId,
};
use crate::error::{Error, Result};
use crate::ports::{
    IDENTITY_CONSTRAINT, LoginAttemptRepository, PastPasswordRepository,
    RESET_HASH_CONSTRAINT, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    past_passwords: Vec<PastPassword>,
    login_attempts: Vec<LoginAttempt>,
    sequence: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.sequence += 1;
        self.sequence
    }

    fn check_unique(&self, user: &User) -> Result<()> {
        let others = self.users.iter().filter(|u| u.id != user.id);

        for other in others {
            if user.enabled && other.enabled && other.identity == user.identity
            {
                return Err(Error::UniqueViolation {
                    constraint: IDENTITY_CONSTRAINT.into(),
                });
            }

            if user.reset_hash.is_some() && other.reset_hash == user.reset_hash
            {
                return Err(Error::UniqueViolation {
                    constraint: RESET_HASH_CONSTRAINT.into(),
                });
            }
        }

        Ok(())
    }
}

/// Memory-backed store.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty [`MemoryStore`].
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|err| Error::Internal(err.to_string().into()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.id == Some(id))
            .cloned())
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.enabled && u.identity == identity)
            .cloned())
    }

    async fn find_by_reset_hash(
        &self,
        reset_hash: &str,
    ) -> Result<Option<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.reset_hash.as_deref() == Some(reset_hash))
            .cloned())
    }

    async fn identity_taken(
        &self,
        identity: &str,
        exclude: Option<UserId>,
    ) -> Result<bool> {
        Ok(self.lock()?.users.iter().any(|u| {
            u.enabled
                && u.identity == identity
                && (exclude.is_none() || u.id != exclude)
        }))
    }

    async fn insert(&self, user: &User) -> Result<UserId> {
        let mut tables = self.lock()?;
        tables.check_unique(user)?;

        let id = tables.next_id();
        let now = Utc::now();
        let mut stored = user.clone();
        stored.id = Some(id);
        stored.pending_password = None;
        stored.created_at = Some(now);
        stored.updated_at = Some(now);
        tables.users.push(stored);

        Ok(id)
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut tables = self.lock()?;
        tables.check_unique(user)?;

        let Some(stored) =
            tables.users.iter_mut().find(|u| u.id.is_some() && u.id == user.id)
        else {
            return Err(Error::NotFound);
        };

        let created_at = stored.created_at;
        *stored = user.clone();
        stored.pending_password = None;
        stored.created_at = created_at;
        stored.updated_at = Some(Utc::now());

        Ok(())
    }
}

#[async_trait]
impl PastPasswordRepository for MemoryStore {
    async fn recent(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<PastPassword>> {
        Ok(self
            .lock()?
            .past_passwords
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn prune(&self, user_id: UserId, keep: usize) -> Result<u64> {
        let mut tables = self.lock()?;

        let kept: Vec<i64> = tables
            .past_passwords
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .take(keep)
            .map(|p| p.id)
            .collect();

        let before = tables.past_passwords.len();
        tables
            .past_passwords
            .retain(|p| p.user_id != user_id || kept.contains(&p.id));

        Ok((before - tables.past_passwords.len()) as u64)
    }

    async fn insert(&self, past: &NewPastPassword) -> Result<PastPassword> {
        let mut tables = self.lock()?;

        let record = PastPassword {
            id: tables.next_id(),
            user_id: past.user_id,
            password_hash: past.password_hash.clone(),
            created_at: past.created_at,
        };
        tables.past_passwords.push(record.clone());

        Ok(record)
    }
}

#[async_trait]
impl LoginAttemptRepository for MemoryStore {
    async fn insert(&self, attempt: &NewLoginAttempt) -> Result<LoginAttempt> {
        let mut tables = self.lock()?;

        let record = LoginAttempt {
            id: tables.next_id(),
            identity: attempt.identity.clone(),
            successful: attempt.successful,
            attempted_at: attempt.attempted_at,
        };
        tables.login_attempts.push(record.clone());

        Ok(record)
    }

    async fn last_successful(
        &self,
        identity: &str,
    ) -> Result<Option<LoginAttempt>> {
        Ok(self
            .lock()?
            .login_attempts
            .iter()
            .rev()
            .find(|a| a.successful && a.identity == identity)
            .cloned())
    }

    async fn recent_failures(
        &self,
        identity: &str,
        after: Option<i64>,
        limit: usize,
    ) -> Result<Vec<LoginAttempt>> {
        let after = after.unwrap_or(i64::MIN);

        Ok(self
            .lock()?
            .login_attempts
            .iter()
            .rev()
            .filter(|a| !a.successful && a.identity == identity && a.id > after)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Password;

    fn user(identity: &str) -> User {
        User::new(identity, "Someone")
    }

    #[tokio::test]
    async fn test_identity_unique_among_enabled() {
        let store = MemoryStore::new();
        UserRepository::insert(&store, &user("bob")).await.unwrap();

        let err = UserRepository::insert(&store, &user("bob")).await.unwrap_err();
        assert!(
            matches!(err, Error::UniqueViolation { constraint } if constraint == IDENTITY_CONSTRAINT)
        );

        let mut disabled = user("bob");
        disabled.enabled = false;
        assert!(UserRepository::insert(&store, &disabled).await.is_ok());
    }

    #[tokio::test]
    async fn test_identity_taken_excludes_self() {
        let store = MemoryStore::new();
        let id = UserRepository::insert(&store, &user("bob")).await.unwrap();

        assert!(store.identity_taken("bob", None).await.unwrap());
        assert!(!store.identity_taken("bob", Some(id)).await.unwrap());
        assert!(!store.identity_taken("alice", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_pending_password_not_stored() {
        let store = MemoryStore::new();
        let mut bob = user("bob");
        bob.replace_password(Password::new("first-password"), "$h1".into());

        let id = UserRepository::insert(&store, &bob).await.unwrap();
        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert!(found.pending_password().is_none());
        assert_eq!(found.password_hash(), "$h1");

        bob.id = Some(id);
        bob.replace_password(Password::new("second-password"), "$h2".into());
        store.update(&bob).await.unwrap();
        assert!(
            store
                .find_by_id(id)
                .await
                .unwrap()
                .unwrap()
                .pending_password()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let store = MemoryStore::new();
        let mut ghost = user("ghost");
        ghost.id = Some(42);

        assert!(matches!(store.update(&ghost).await, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn test_prune_keeps_newest() {
        let store = MemoryStore::new();
        for hash in ["h1", "h2", "h3"] {
            PastPasswordRepository::insert(
                &store,
                &NewPastPassword {
                    user_id: 1,
                    password_hash: hash.into(),
                    created_at: Utc::now(),
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(store.prune(1, 1).await.unwrap(), 2);
        let left = store.recent(1, 10).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].password_hash, "h3");
    }

    #[tokio::test]
    async fn test_recent_failures_after_sequence() {
        let store = MemoryStore::new();
        let attempt = |successful| NewLoginAttempt {
            identity: "bob".into(),
            successful,
            attempted_at: Utc::now(),
        };

        LoginAttemptRepository::insert(&store, &attempt(false)).await.unwrap();
        let ok = LoginAttemptRepository::insert(&store, &attempt(true))
            .await
            .unwrap();
        LoginAttemptRepository::insert(&store, &attempt(false)).await.unwrap();

        let last = store.last_successful("bob").await.unwrap().unwrap();
        assert_eq!(last.id, ok.id);

        let failures =
            store.recent_failures("bob", Some(ok.id), 10).await.unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].id > ok.id);

        assert_eq!(store.recent_failures("bob", None, 10).await.unwrap().len(), 2);
        assert_eq!(store.recent_failures("bob", None, 1).await.unwrap().len(), 1);
    }
}
