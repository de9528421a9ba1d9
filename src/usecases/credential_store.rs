//! Two-phase persistence of user records.
//!
//! `save` validates, writes the row, then runs the after-commit actions in
//! order. Archival therefore never happens for a write that failed.

use std::sync::Arc;

use validator::ValidationErrors;

use crate::config::AuthenticationSettings;
use crate::domain::{AfterCommit, User, UserId};
use crate::error::{Error, Result, field_error};
use crate::ports::{IDENTITY_CONSTRAINT, UserRepository};
use crate::usecases::{PasswordHistoryGuard, Ports};

/// Persisted user records.
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
    history: Arc<PasswordHistoryGuard>,
    settings: Arc<AuthenticationSettings>,
}

impl CredentialStore {
    pub fn new(
        ports: &Ports,
        history: Arc<PasswordHistoryGuard>,
        settings: Arc<AuthenticationSettings>,
    ) -> Self {
        Self {
            users: Arc::clone(&ports.users),
            history,
            settings,
        }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: UserId) -> Result<User> {
        self.users.find_by_id(id).await?.ok_or(Error::NotFound)
    }

    /// Find an enabled user by identity.
    pub async fn find_by_identity(&self, identity: &str) -> Result<Option<User>> {
        self.users.find_by_identity(identity).await
    }

    /// Find the user holding `reset_hash`.
    pub async fn find_by_reset_hash(&self, reset_hash: &str) -> Result<User> {
        self.users
            .find_by_reset_hash(reset_hash)
            .await?
            .ok_or(Error::NotFound)
    }

    /// Collect every consistency error of `user`.
    pub async fn validate(&self, user: &User) -> Result<ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let column = self.settings.identity_column.as_str();

        if user.enabled {
            if user.identity.trim().is_empty() {
                errors.add(
                    column,
                    field_error("required", format!("{column} cannot be blank.")),
                );
            } else if self.users.identity_taken(&user.identity, user.id).await? {
                errors.add(column, identity_taken(column));
            }
        }

        if user.password_hash().is_empty() {
            errors.add(
                "password",
                field_error("required", "Password cannot be blank."),
            );
        }

        if let Some(change) = user.pending_password() {
            change.password.validate(&mut errors);
        }

        self.history.validate_change(user, &mut errors).await?;

        Ok(errors)
    }

    /// Validate, persist, then run after-commit actions.
    ///
    /// Assigns `user.id` on first save.
    pub async fn save(&self, user: &mut User) -> Result<()> {
        let errors = self.validate(user).await?;
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        // The cleartext never reaches the store.
        let pending = user.take_pending();

        let written = match user.id {
            Some(id) => self
                .users
                .update(user)
                .await
                .map(|()| id)
                .map_err(|err| self.conflict(err)),
            None => self
                .users
                .insert(user)
                .await
                .map_err(|err| self.conflict(err)),
        };

        let user_id = match written {
            Ok(id) => id,
            Err(err) => {
                user.restore_pending(pending);
                return Err(err);
            },
        };
        user.id = Some(user_id);

        for action in AfterCommit::for_change(pending) {
            match action {
                AfterCommit::ArchivePassword { previous_hash } => {
                    self.history.after_save(user_id, previous_hash).await?
                },
            }
        }

        Ok(())
    }

    /// Identity conflicts lost to a concurrent writer are validation errors.
    fn conflict(&self, err: Error) -> Error {
        match err {
            Error::UniqueViolation { constraint }
                if constraint == IDENTITY_CONSTRAINT =>
            {
                let column = self.settings.identity_column.as_str();
                let mut errors = ValidationErrors::new();
                errors.add(column, identity_taken(column));
                Error::Validation(errors)
            },
            err => err,
        }
    }
}

fn identity_taken(column: &str) -> validator::ValidationError {
    field_error("unique", format!("{column} is already in use."))
}
