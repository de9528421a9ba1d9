//! Login audit trail, lockout and password expiry.
//!
//! Lockout is derived from the trail, never stored: failures after the
//! latest success are counted, and the account stays locked only while the
//! newest failure is younger than the lockout duration.

use std::sync::Arc;

use crate::config::AuthenticationSettings;
use crate::domain::{LoginAttempt, NewLoginAttempt, User};
use crate::error::Result;
use crate::ports::{Clock, LoginAttemptRepository};
use crate::telemetry;
use crate::usecases::Ports;

/// Records login attempts and derives account access state.
pub struct LoginAttemptGuard {
    attempts: Arc<dyn LoginAttemptRepository>,
    clock: Arc<dyn Clock>,
    settings: Arc<AuthenticationSettings>,
}

impl LoginAttemptGuard {
    pub fn new(ports: &Ports, settings: Arc<AuthenticationSettings>) -> Self {
        Self {
            attempts: Arc::clone(&ports.login_attempts),
            clock: Arc::clone(&ports.clock),
            settings,
        }
    }

    /// Append an attempt to the trail.
    pub async fn record(
        &self,
        identity: &str,
        successful: bool,
    ) -> Result<LoginAttempt> {
        let attempt = self
            .attempts
            .insert(&NewLoginAttempt {
                identity: identity.to_owned(),
                successful,
                attempted_at: self.clock.now(),
            })
            .await?;

        telemetry::record_login_attempt(successful);

        Ok(attempt)
    }

    pub async fn is_locked_out(&self, user: &User) -> Result<bool> {
        self.is_identity_locked_out(&user.identity).await
    }

    /// Lockout predicate for an identity, known account or not.
    pub async fn is_identity_locked_out(&self, identity: &str) -> Result<bool> {
        if !self.settings.disable_account_after_failed_login_attempts {
            return Ok(false);
        }

        let threshold =
            self.settings.number_of_failed_login_attempts_threshold as usize;
        let baseline = self
            .attempts
            .last_successful(identity)
            .await?
            .map(|attempt| attempt.id);

        let failures = self
            .attempts
            .recent_failures(identity, baseline, threshold.max(1))
            .await?;

        if failures.len() < threshold {
            return Ok(false);
        }

        let Some(latest) = failures.first() else {
            return Ok(false);
        };

        let elapsed = self.clock.now() - latest.attempted_at;
        Ok(elapsed < self.settings.lockout_duration())
    }

    /// Whether the password is older than the expiration interval.
    pub fn is_expired(&self, user: &User) -> bool {
        match (
            self.settings.password_expiration(),
            user.last_password_change_at,
        ) {
            (Some(interval), Some(changed_at)) => {
                self.clock.now() - changed_at > interval
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::testing::Harness;

    fn settings() -> AuthenticationSettings {
        AuthenticationSettings {
            number_of_failed_login_attempts_threshold: 3,
            total_minutes_to_disable_user_account: 15,
            password_expiration_interval_in_days: Some(30),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_lockout_decays() {
        let harness = Harness::new(settings());
        let guard = harness.attempts();

        for _ in 0..2 {
            guard.record("bob", false).await.unwrap();
        }
        assert!(!guard.is_identity_locked_out("bob").await.unwrap());

        guard.record("bob", false).await.unwrap();
        assert!(guard.is_identity_locked_out("bob").await.unwrap());

        harness.clock.advance(Duration::minutes(14));
        assert!(guard.is_identity_locked_out("bob").await.unwrap());

        harness.clock.advance(Duration::minutes(2));
        assert!(!guard.is_identity_locked_out("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_success_resets_baseline() {
        let harness = Harness::new(settings());
        let guard = harness.attempts();

        for _ in 0..3 {
            guard.record("bob", false).await.unwrap();
        }
        assert!(guard.is_identity_locked_out("bob").await.unwrap());

        guard.record("bob", true).await.unwrap();
        assert!(!guard.is_identity_locked_out("bob").await.unwrap());

        for _ in 0..2 {
            guard.record("bob", false).await.unwrap();
        }
        assert!(!guard.is_identity_locked_out("bob").await.unwrap());

        guard.record("bob", false).await.unwrap();
        assert!(guard.is_identity_locked_out("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_identities_are_independent() {
        let harness = Harness::new(settings());
        let guard = harness.attempts();

        for _ in 0..3 {
            guard.record("bob", false).await.unwrap();
        }

        assert!(!guard.is_identity_locked_out("alice").await.unwrap());
        assert!(
            guard
                .is_locked_out(&User::new("bob", "Bob"))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_lockout_disabled() {
        let harness = Harness::new(AuthenticationSettings {
            disable_account_after_failed_login_attempts: false,
            ..settings()
        });
        let guard = harness.attempts();

        for _ in 0..10 {
            guard.record("bob", false).await.unwrap();
        }
        assert!(!guard.is_identity_locked_out("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_password_expiry() {
        let harness = Harness::new(settings());
        let guard = harness.attempts();

        let mut user = User::new("bob", "Bob");
        assert!(!guard.is_expired(&user));

        user.last_password_change_at =
            Some(harness.clock.now() - Duration::days(31));
        assert!(guard.is_expired(&user));

        user.last_password_change_at =
            Some(harness.clock.now() - Duration::days(29));
        assert!(!guard.is_expired(&user));
    }

    #[tokio::test]
    async fn test_password_expiry_off() {
        for days in [None, Some(0)] {
            let harness = Harness::new(AuthenticationSettings {
                password_expiration_interval_in_days: days,
                ..settings()
            });

            let mut user = User::new("bob", "Bob");
            user.last_password_change_at =
                Some(harness.clock.now() - Duration::days(3650));
            assert!(!harness.attempts().is_expired(&user));
        }
    }
}
