//! PostgreSQL implementation for user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::map_unique;
use super::models::UserRecord;
use crate::domain::{User, UserId};
use crate::error::{Error, Result};
use crate::ports::UserRepository;

const SELECT_USER: &str = r#"
    SELECT
        id, identity, full_name, password, enabled,
        reset_hash, reset_requested_at, login_token, login_token_expiry,
        last_password_change_at, created_at, updated_at
    FROM users
"#;

/// PostgreSQL user repository.
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new [`PgUserRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, filter: &str, value: &str) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "{SELECT_USER} WHERE {filter}"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(User::from))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "{SELECT_USER} WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(User::from))
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<User>> {
        self.find_one("identity = $1 AND enabled", identity).await
    }

    async fn find_by_reset_hash(
        &self,
        reset_hash: &str,
    ) -> Result<Option<User>> {
        self.find_one("reset_hash = $1", reset_hash).await
    }

    async fn identity_taken(
        &self,
        identity: &str,
        exclude: Option<UserId>,
    ) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE identity = $1
                  AND enabled
                  AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(identity)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn insert(&self, user: &User) -> Result<UserId> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (
                identity, full_name, password, enabled,
                reset_hash, reset_requested_at, login_token, login_token_expiry,
                last_password_change_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&user.identity)
        .bind(&user.full_name)
        .bind(user.password_hash())
        .bind(user.enabled)
        .bind(&user.reset_hash)
        .bind(user.reset_requested_at)
        .bind(&user.login_token)
        .bind(user.login_token_expiry)
        .bind(user.last_password_change_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)?;

        Ok(id)
    }

    async fn update(&self, user: &User) -> Result<()> {
        let Some(id) = user.id else {
            return Err(Error::InvalidState("user has no id"));
        };

        let result = sqlx::query(
            r#"
            UPDATE users
            SET
                identity = $2,
                full_name = $3,
                password = $4,
                enabled = $5,
                reset_hash = $6,
                reset_requested_at = $7,
                login_token = $8,
                login_token_expiry = $9,
                last_password_change_at = $10,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&user.identity)
        .bind(&user.full_name)
        .bind(user.password_hash())
        .bind(user.enabled)
        .bind(&user.reset_hash)
        .bind(user.reset_requested_at)
        .bind(&user.login_token)
        .bind(user.login_token_expiry)
        .bind(user.last_password_change_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::AuthenticationSettings;
    use crate::domain::Password;
    use crate::ports::IDENTITY_CONSTRAINT;
    use crate::testing::postgres_ports;
    use crate::usecases::{CredentialStore, PasswordHistoryGuard};

    fn user(identity: &str) -> User {
        let mut user = User::new(identity, "Someone");
        user.password_hash = "$argon2id$placeholder".into();
        user
    }

    /// Skips the pre-save lookup so the index has the last word.
    struct Racing(PgUserRepository);

    #[async_trait]
    impl UserRepository for Racing {
        async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
            self.0.find_by_id(id).await
        }

        async fn find_by_identity(
            &self,
            identity: &str,
        ) -> Result<Option<User>> {
            self.0.find_by_identity(identity).await
        }

        async fn find_by_reset_hash(
            &self,
            reset_hash: &str,
        ) -> Result<Option<User>> {
            self.0.find_by_reset_hash(reset_hash).await
        }

        async fn identity_taken(
            &self,
            _identity: &str,
            _exclude: Option<UserId>,
        ) -> Result<bool> {
            Ok(false)
        }

        async fn insert(&self, user: &User) -> Result<UserId> {
            self.0.insert(user).await
        }

        async fn update(&self, user: &User) -> Result<()> {
            self.0.update(user).await
        }
    }

    #[sqlx::test]
    async fn test_insert_and_find(pool: PgPool) {
        let repo = PgUserRepository::new(pool);
        let id = repo.insert(&user("bob")).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.identity, "bob");
        assert!(found.enabled);
        assert!(found.created_at.is_some());

        assert!(repo.find_by_identity("bob").await.unwrap().is_some());
        assert!(repo.find_by_identity("alice").await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_identity_index_only_covers_enabled(pool: PgPool) {
        let repo = PgUserRepository::new(pool);
        let id = repo.insert(&user("bob")).await.unwrap();

        let err = repo.insert(&user("bob")).await.unwrap_err();
        assert!(
            matches!(err, Error::UniqueViolation { constraint } if constraint == IDENTITY_CONSTRAINT)
        );

        let mut disabled = user("bob");
        disabled.enabled = false;
        assert!(repo.insert(&disabled).await.is_ok());

        assert!(repo.identity_taken("bob", None).await.unwrap());
        assert!(!repo.identity_taken("bob", Some(id)).await.unwrap());
    }

    #[sqlx::test]
    async fn test_update_unknown_user(pool: PgPool) {
        let repo = PgUserRepository::new(pool);
        let mut ghost = user("ghost");
        ghost.id = Some(42);

        assert!(matches!(repo.update(&ghost).await, Err(Error::NotFound)));
    }

    #[sqlx::test]
    async fn test_index_conflict_is_validation_error(pool: PgPool) {
        let mut ports = postgres_ports(pool.clone());
        ports.users = Arc::new(Racing(PgUserRepository::new(pool)));

        let settings = Arc::new(AuthenticationSettings::default());
        let history =
            Arc::new(PasswordHistoryGuard::new(&ports, Arc::clone(&settings)));
        let store = CredentialStore::new(&ports, Arc::clone(&history), settings);

        for expect_ok in [true, false] {
            let mut bob = User::new("bob", "Bob");
            history
                .set_password(&mut bob, Password::new("first-password"))
                .unwrap();

            let res = store.save(&mut bob).await;
            if expect_ok {
                res.unwrap();
            } else {
                let err = res.unwrap_err();
                assert!(
                    err.validation_errors()
                        .unwrap()
                        .field_errors()
                        .contains_key("username")
                );
                assert!(bob.id.is_none());
            }
        }
    }
}
