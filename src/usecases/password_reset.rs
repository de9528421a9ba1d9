//! Password reset through a single-use hash.

use std::sync::Arc;

use crate::config::AuthenticationSettings;
use crate::domain::{Password, User};
use crate::error::{Error, Result};
use crate::ports::{Clock, Hasher, SecureRandom};
use crate::telemetry;
use crate::usecases::{CredentialStore, PasswordHistoryGuard, Ports};

const NONCE_LENGTH: usize = 32;

/// Issues and redeems reset hashes.
pub struct PasswordResetFlow {
    store: Arc<CredentialStore>,
    history: Arc<PasswordHistoryGuard>,
    hasher: Arc<dyn Hasher>,
    random: Arc<dyn SecureRandom>,
    clock: Arc<dyn Clock>,
    settings: Arc<AuthenticationSettings>,
}

impl PasswordResetFlow {
    pub fn new(
        ports: &Ports,
        store: Arc<CredentialStore>,
        history: Arc<PasswordHistoryGuard>,
        settings: Arc<AuthenticationSettings>,
    ) -> Self {
        Self {
            store,
            history,
            hasher: Arc::clone(&ports.hasher),
            random: Arc::clone(&ports.random),
            clock: Arc::clone(&ports.clock),
            settings,
        }
    }

    /// Generate a reset hash, store it on `user` and persist.
    ///
    /// Any previously issued hash stops working.
    pub async fn request_reset(&self, user: &mut User) -> Result<String> {
        let Some(id) = user.id else {
            return Err(Error::InvalidState("user must be saved first"));
        };

        let now = self.clock.now();
        let nonce = self.random.random_hex(NONCE_LENGTH)?;
        let seed = format!(
            "{id}:{}:{nonce}",
            now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp())
        );
        let reset_hash = self.hasher.digest(seed.as_bytes());

        user.reset_hash = Some(reset_hash.clone());
        user.reset_requested_at = Some(now);
        self.store.save(user).await?;

        telemetry::record_password_reset("requested");

        Ok(reset_hash)
    }

    /// Find the user a reset hash was issued to.
    ///
    /// A hash older than the configured TTL is not found.
    pub async fn find_by_reset_hash(&self, reset_hash: &str) -> Result<User> {
        if reset_hash.is_empty() {
            return Err(Error::NotFound);
        }

        let user = self.store.find_by_reset_hash(reset_hash).await?;

        if let (Some(ttl), Some(requested_at)) =
            (self.settings.reset_hash_ttl(), user.reset_requested_at)
        {
            if self.clock.now() - requested_at > ttl {
                tracing::info!(user_id = ?user.id, "reset hash expired");
                return Err(Error::NotFound);
            }
        }

        Ok(user)
    }

    /// Change the password of the user holding the reset hash.
    ///
    /// Clears the hash, so it cannot be used twice.
    pub async fn redeem(&self, user: &mut User, password: Password) -> Result<()> {
        self.history.set_password(user, password)?;
        self.store.save(user).await?;

        telemetry::record_password_reset("redeemed");

        Ok(())
    }
}
