use chrono::{DateTime, Utc};

use crate::domain::Password;

pub type UserId = i64;

/// Account as saved on database.
///
/// `id` is `None` until the record is first saved.
#[derive(Clone, Default)]
pub struct User {
    pub id: Option<UserId>,
    pub identity: String,
    pub full_name: String,
    pub(crate) password_hash: String,
    pub enabled: bool,
    pub reset_hash: Option<String>,
    pub reset_requested_at: Option<DateTime<Utc>>,
    pub login_token: Option<String>,
    pub login_token_expiry: Option<DateTime<Utc>>,
    pub last_password_change_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub(crate) pending_password: Option<PasswordChange>,
}

/// Unsaved password change.
///
/// Holds the new cleartext for reuse checks and the hash it supersedes.
#[derive(Clone, Debug)]
pub struct PasswordChange {
    pub password: Password,
    pub previous_hash: String,
}

/// Side effect run once the user row is saved.
#[derive(Clone, Debug)]
pub enum AfterCommit {
    /// Archive a superseded password hash.
    ArchivePassword { previous_hash: String },
}

impl User {
    /// Creates a new enabled account without any password.
    pub fn new(identity: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            full_name: full_name.into(),
            enabled: true,
            ..Default::default()
        }
    }

    /// Stored password hash (PHC string).
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Replace the password hash and remember what it superseded.
    ///
    /// Calling twice before saving keeps the original previous hash.
    pub(crate) fn replace_password(&mut self, password: Password, hash: String) {
        let previous_hash = std::mem::replace(&mut self.password_hash, hash);
        let previous_hash = match self.pending_password.take() {
            Some(change) => change.previous_hash,
            None => previous_hash,
        };

        self.pending_password = Some(PasswordChange {
            password,
            previous_hash,
        });
    }

    /// Password changed since the last save.
    pub fn pending_password(&self) -> Option<&PasswordChange> {
        self.pending_password.as_ref()
    }

    /// Detach the pending password change before writing the record.
    ///
    /// Hand it back with [`User::restore_pending`] if the write fails.
    pub(crate) fn take_pending(&mut self) -> Option<PasswordChange> {
        self.pending_password.take()
    }

    pub(crate) fn restore_pending(&mut self, change: Option<PasswordChange>) {
        if self.pending_password.is_none() {
            self.pending_password = change;
        }
    }
}

impl AfterCommit {
    /// Actions to run once a write carrying `change` is saved.
    pub(crate) fn for_change(change: Option<PasswordChange>) -> Vec<Self> {
        let mut actions = Vec::new();

        if let Some(change) = change {
            if !change.previous_hash.is_empty() {
                actions.push(AfterCommit::ArchivePassword {
                    previous_hash: change.previous_hash,
                });
            }
        }

        actions
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .field("full_name", &self.full_name)
            .field("password_hash", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .field("reset_requested_at", &self.reset_requested_at)
            .field("login_token_expiry", &self.login_token_expiry)
            .field("last_password_change_at", &self.last_password_change_at)
            .field("password_changed", &self.pending_password.is_some())
            .finish()
    }
}
