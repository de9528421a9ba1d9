//! Persistent ("remember me") login tokens.
//!
//! A token is a keyed digest of the identity, password hash, display name,
//! enabled flag and id. Changing any of them invalidates outstanding tokens
//! without a revocation list.

use std::sync::Arc;

use crate::config::AuthenticationSettings;
use crate::domain::{User, UserId};
use crate::error::{Error, Result};
use crate::ports::{Clock, Hasher, PasswordHasher};
use crate::usecases::{CredentialStore, Ports};

/// Issues and validates persistent login tokens.
pub struct PersistentLoginToken {
    store: Arc<CredentialStore>,
    hasher: Arc<dyn Hasher>,
    password_hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    settings: Arc<AuthenticationSettings>,
}

impl PersistentLoginToken {
    pub fn new(
        ports: &Ports,
        store: Arc<CredentialStore>,
        settings: Arc<AuthenticationSettings>,
    ) -> Self {
        Self {
            store,
            hasher: Arc::clone(&ports.hasher),
            password_hasher: Arc::clone(&ports.password_hasher),
            clock: Arc::clone(&ports.clock),
            settings,
        }
    }

    fn derive(&self, user: &User, id: UserId) -> Result<String> {
        let identity_seed = self.hasher.digest(
            format!(
                "{}{}{}{}{}",
                user.identity,
                user.password_hash(),
                user.full_name,
                user.enabled,
                id
            )
            .as_bytes(),
        );
        let secondary_salt =
            self.hasher.digest(user.password_hash().as_bytes());

        self.hasher
            .keyed_digest(secondary_salt.as_bytes(), identity_seed.as_bytes())
    }

    /// Issue a token for a saved user and persist it with its expiry.
    pub async fn issue(&self, user: &mut User) -> Result<String> {
        let Some(id) = user.id else {
            return Err(Error::InvalidState("user must be saved first"));
        };

        let expiry = self
            .clock
            .now()
            .checked_add_signed(self.settings.login_token_ttl())
            .ok_or(Error::InvalidState("login token TTL out of range"))?;

        let token = self.derive(user, id)?;
        user.login_token = Some(token.clone());
        user.login_token_expiry = Some(expiry);
        self.store.save(user).await?;

        Ok(token)
    }

    /// Check `supplied` against the stored token, its expiry, then the
    /// user's current state.
    pub fn validate(&self, user: &User, supplied: &str) -> Result<bool> {
        if user.login_token.as_deref() != Some(supplied) {
            return Ok(false);
        }

        match user.login_token_expiry {
            Some(expiry) if self.clock.now() <= expiry => {},
            _ => return Ok(false),
        }

        let Some(id) = user.id else {
            return Ok(false);
        };

        let expected = self.derive(user, id)?;
        Ok(self.password_hasher.compare(&expected, supplied))
    }

    /// Forget the stored token.
    pub async fn revoke(&self, user: &mut User) -> Result<()> {
        user.login_token = None;
        user.login_token_expiry = None;
        self.store.save(user).await
    }
}
