//! Shared fixtures for unit tests.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sqlx::PgPool;

use crate::adapters::{
    Argon2PasswordHasher, FixedClock, MemoryStore, OsRngRandom,
    PgLoginAttemptRepository, PgPastPasswordRepository, PgUserRepository,
    Sha256Hasher, SystemClock,
};
use crate::config::{Argon2, AuthenticationSettings};
use crate::domain::{Password, User};
use crate::usecases::{
    AuthenticationService, CredentialStore, LoginAttemptGuard,
    PasswordHistoryGuard, PasswordResetFlow, PersistentLoginToken, Ports,
};

/// Argon2 hasher with the cheapest parameters.
pub fn hasher() -> Argon2PasswordHasher {
    Argon2PasswordHasher::new(Some(Argon2 {
        memory_cost: 1024,
        iterations: 1,
        parallelism: 1,
        hash_length: 32,
    }))
    .unwrap()
}

/// Ports backed by PostgreSQL, for `#[sqlx::test]` cases.
pub fn postgres_ports(pool: PgPool) -> Ports {
    Ports {
        users: Arc::new(PgUserRepository::new(pool.clone())),
        past_passwords: Arc::new(PgPastPasswordRepository::new(pool.clone())),
        login_attempts: Arc::new(PgLoginAttemptRepository::new(pool)),
        password_hasher: Arc::new(hasher()),
        hasher: Arc::new(Sha256Hasher::new(b"pepper")),
        random: Arc::new(OsRngRandom::new()),
        clock: Arc::new(SystemClock::new()),
    }
}

/// In-memory ports with a frozen clock.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub ports: Ports,
    pub settings: Arc<AuthenticationSettings>,
}

impl Harness {
    pub fn new(settings: AuthenticationSettings) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ));

        let ports = Ports {
            users: store.clone(),
            past_passwords: store.clone(),
            login_attempts: store.clone(),
            password_hasher: Arc::new(hasher()),
            hasher: Arc::new(Sha256Hasher::new(b"pepper")),
            random: Arc::new(OsRngRandom::new()),
            clock: clock.clone(),
        };

        Self {
            store,
            clock,
            ports,
            settings: Arc::new(settings),
        }
    }

    pub fn history(&self) -> Arc<PasswordHistoryGuard> {
        Arc::new(PasswordHistoryGuard::new(
            &self.ports,
            Arc::clone(&self.settings),
        ))
    }

    pub fn credentials(&self) -> Arc<CredentialStore> {
        Arc::new(CredentialStore::new(
            &self.ports,
            self.history(),
            Arc::clone(&self.settings),
        ))
    }

    pub fn attempts(&self) -> LoginAttemptGuard {
        LoginAttemptGuard::new(&self.ports, Arc::clone(&self.settings))
    }

    pub fn reset(&self) -> PasswordResetFlow {
        PasswordResetFlow::new(
            &self.ports,
            self.credentials(),
            self.history(),
            Arc::clone(&self.settings),
        )
    }

    pub fn tokens(&self) -> PersistentLoginToken {
        PersistentLoginToken::new(
            &self.ports,
            self.credentials(),
            Arc::clone(&self.settings),
        )
    }

    pub fn service(&self) -> AuthenticationService {
        AuthenticationService::new((*self.settings).clone(), self.ports.clone())
    }

    /// Saved enabled user with `password`.
    pub async fn user(&self, identity: &str, password: &str) -> User {
        let mut user = User::new(identity, "Someone");
        self.history()
            .set_password(&mut user, Password::new(password))
            .unwrap();
        self.credentials().save(&mut user).await.unwrap();
        user
    }
}
