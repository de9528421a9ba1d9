//! Public authentication operations.
//!
//! Every other service is internal wiring; callers only need this facade.

use std::sync::Arc;

use crate::config::AuthenticationSettings;
use crate::domain::{Password, User, UserId};
use crate::error::{Error, Result};
use crate::ports::PasswordHasher;
use crate::telemetry;
use crate::usecases::{
    CredentialStore, LoginAttemptGuard, PasswordHistoryGuard,
    PasswordResetFlow, PersistentLoginToken, Ports,
};

/// Account to register.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub identity: String,
    pub full_name: String,
    pub password: Password,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    /// Persistent login token, valid until the configured TTL.
    pub token: String,
    /// Password is past its expiration interval and should be changed.
    pub password_expired: bool,
}

/// Authentication operations over a set of [`Ports`].
pub struct AuthenticationService {
    store: Arc<CredentialStore>,
    history: Arc<PasswordHistoryGuard>,
    attempts: LoginAttemptGuard,
    resets: PasswordResetFlow,
    tokens: PersistentLoginToken,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl AuthenticationService {
    pub fn new(settings: AuthenticationSettings, ports: Ports) -> Self {
        let settings = Arc::new(settings);

        let history =
            Arc::new(PasswordHistoryGuard::new(&ports, Arc::clone(&settings)));
        let store = Arc::new(CredentialStore::new(
            &ports,
            Arc::clone(&history),
            Arc::clone(&settings),
        ));

        Self {
            attempts: LoginAttemptGuard::new(&ports, Arc::clone(&settings)),
            resets: PasswordResetFlow::new(
                &ports,
                Arc::clone(&store),
                Arc::clone(&history),
                Arc::clone(&settings),
            ),
            tokens: PersistentLoginToken::new(
                &ports,
                Arc::clone(&store),
                settings,
            ),
            password_hasher: Arc::clone(&ports.password_hasher),
            store,
            history,
        }
    }

    /// Create an enabled account.
    #[tracing::instrument(skip_all, fields(identity = %new.identity))]
    pub async fn register(&self, new: NewUser) -> Result<User> {
        let mut user = User::new(new.identity, new.full_name);
        self.history.set_password(&mut user, new.password)?;
        self.store.save(&mut user).await?;

        tracing::info!(user_id = ?user.id, "user registered");

        Ok(user)
    }

    /// Issue a reset hash for an enabled account.
    ///
    /// Returns the hash to deliver to the account holder.
    #[tracing::instrument(skip(self))]
    pub async fn request_password_reset(&self, identity: &str) -> Result<String> {
        let mut user = self
            .store
            .find_by_identity(identity)
            .await?
            .ok_or(Error::NotFound)?;

        self.resets.request_reset(&mut user).await
    }

    /// Set a new password using a reset hash.
    #[tracing::instrument(skip_all)]
    pub async fn confirm_password_reset(
        &self,
        reset_hash: &str,
        password: Password,
    ) -> Result<User> {
        let mut user = self.resets.find_by_reset_hash(reset_hash).await?;
        if !user.enabled {
            return Err(Error::NotFound);
        }

        self.resets.redeem(&mut user, password).await?;

        tracing::info!(user_id = ?user.id, "password reset");

        Ok(user)
    }

    /// Replace the password of a known account.
    #[tracing::instrument(skip(self, password))]
    pub async fn change_password(
        &self,
        user_id: UserId,
        password: Password,
    ) -> Result<User> {
        let mut user = self.store.find_by_id(user_id).await?;
        self.history.set_password(&mut user, password)?;
        self.store.save(&mut user).await?;

        Ok(user)
    }

    /// Verify credentials, record the attempt and issue a login token.
    ///
    /// Unknown identities and wrong passwords are indistinguishable to the
    /// caller.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(
        &self,
        identity: &str,
        password: &Password,
    ) -> Result<LoginOutcome> {
        let Some(mut user) = self.store.find_by_identity(identity).await?
        else {
            self.attempts.record(identity, false).await?;
            return Err(Error::InvalidCredentials);
        };

        if self.attempts.is_locked_out(&user).await? {
            self.attempts.record(identity, false).await?;
            telemetry::record_lockout();
            tracing::warn!(user_id = ?user.id, "login refused, account locked");
            return Err(Error::LockedOut);
        }

        if !self.password_hasher.verify(password, user.password_hash()) {
            self.attempts.record(identity, false).await?;
            return Err(Error::InvalidCredentials);
        }

        let token = self.tokens.issue(&mut user).await?;
        self.attempts.record(identity, true).await?;
        let password_expired = self.attempts.is_expired(&user);

        tracing::info!(user_id = ?user.id, password_expired, "user logged in");

        Ok(LoginOutcome {
            user,
            token,
            password_expired,
        })
    }

    /// Authenticate with a persistent login token.
    #[tracing::instrument(skip(self, token))]
    pub async fn login_via_token(
        &self,
        user_id: UserId,
        token: &str,
    ) -> Result<User> {
        let user = match self.store.find_by_id(user_id).await {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidToken),
            Err(err) => return Err(err),
        };

        if !user.enabled || !self.tokens.validate(&user, token)? {
            tracing::warn!(user_id, "login token rejected");
            return Err(Error::InvalidToken);
        }

        Ok(user)
    }

    /// Revoke the persistent login token.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self, user_id: UserId) -> Result<()> {
        let mut user = self.store.find_by_id(user_id).await?;
        self.tokens.revoke(&mut user).await
    }

    /// Enable or disable an account.
    #[tracing::instrument(skip(self))]
    pub async fn set_enabled(
        &self,
        user_id: UserId,
        enabled: bool,
    ) -> Result<User> {
        let mut user = self.store.find_by_id(user_id).await?;
        user.enabled = enabled;
        self.store.save(&mut user).await?;

        Ok(user)
    }

    /// Enabled account using `identity`.
    pub async fn find_by_identity(&self, identity: &str) -> Result<Option<User>> {
        self.store.find_by_identity(identity).await
    }

    pub async fn is_locked_out(&self, identity: &str) -> Result<bool> {
        self.attempts.is_identity_locked_out(identity).await
    }

    pub async fn is_expired(&self, user_id: UserId) -> Result<bool> {
        let user = self.store.find_by_id(user_id).await?;
        Ok(self.attempts.is_expired(&user))
    }
}
