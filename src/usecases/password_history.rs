//! Password reuse prevention.

use std::sync::Arc;

use validator::ValidationErrors;

use crate::config::AuthenticationSettings;
use crate::domain::{NewPastPassword, Password, User, UserId};
use crate::error::{Result, field_error};
use crate::ports::{Clock, PasswordHasher, PastPasswordRepository};
use crate::telemetry;
use crate::usecases::Ports;

/// Sets passwords and keeps the per-user history of superseded hashes.
pub struct PasswordHistoryGuard {
    past_passwords: Arc<dyn PastPasswordRepository>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    settings: Arc<AuthenticationSettings>,
}

impl PasswordHistoryGuard {
    pub fn new(ports: &Ports, settings: Arc<AuthenticationSettings>) -> Self {
        Self {
            past_passwords: Arc::clone(&ports.past_passwords),
            hasher: Arc::clone(&ports.password_hasher),
            clock: Arc::clone(&ports.clock),
            settings,
        }
    }

    /// Hash and set a new password on `user`.
    ///
    /// Clears any pending reset hash. Nothing is persisted: reuse is checked
    /// when the user is saved.
    pub fn set_password(&self, user: &mut User, password: Password) -> Result<()> {
        let hash = self.hasher.hash(&password)?;

        user.replace_password(password, hash);
        user.reset_hash = None;
        user.reset_requested_at = None;
        user.last_password_change_at = Some(self.clock.now());

        Ok(())
    }

    /// Reject a pending password matching one of the last archived ones.
    pub async fn validate_change(
        &self,
        user: &User,
        errors: &mut ValidationErrors,
    ) -> Result<()> {
        if !self.settings.checks_password_history() {
            return Ok(());
        }

        let (Some(change), Some(user_id)) = (user.pending_password(), user.id)
        else {
            return Ok(());
        };

        let window =
            self.settings.number_of_past_passwords_to_compare_to as usize;
        let past = self.past_passwords.recent(user_id, window).await?;

        if past
            .iter()
            .any(|p| self.hasher.verify(&change.password, &p.password_hash))
        {
            errors.add(
                "password",
                field_error(
                    "password_reused",
                    format!(
                        "Password was already used in the last {window} changes."
                    ),
                ),
            );
        }

        Ok(())
    }

    /// Archive the superseded hash once the user row is saved.
    pub async fn after_save(
        &self,
        user_id: UserId,
        previous_hash: String,
    ) -> Result<()> {
        if !self.settings.store_user_password_changes {
            return Ok(());
        }

        // Leave room for the hash appended below.
        let keep = (self.settings.number_of_past_passwords_to_compare_to
            as usize)
            .saturating_sub(1);
        let pruned = self.past_passwords.prune(user_id, keep).await?;
        if pruned > 0 {
            tracing::debug!(user_id, pruned, "password history pruned");
            telemetry::record_pruned(pruned);
        }

        self.past_passwords
            .insert(&NewPastPassword {
                user_id,
                password_hash: previous_hash,
                created_at: self.clock.now(),
            })
            .await?;

        Ok(())
    }
}
