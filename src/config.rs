//! Configuration manager for warden.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Authentication policy.
    #[serde(default)]
    pub authentication: AuthenticationSettings,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Related to Argon2 configuration.
    #[serde(skip_serializing)]
    pub argon2: Option<Argon2>,
}

/// Column used to look up an account at login.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityColumn {
    #[default]
    Username,
    Email,
}

impl IdentityColumn {
    /// Field name used when reporting validation errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityColumn::Username => "username",
            IdentityColumn::Email => "email",
        }
    }
}

impl std::fmt::Display for IdentityColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication policy, read-only once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationSettings {
    pub identity_column: IdentityColumn,
    /// Archive superseded password hashes.
    pub store_user_password_changes: bool,
    /// History window. `0` disables reuse checks.
    pub number_of_past_passwords_to_compare_to: u32,
    /// `None` or `0` disables expiry.
    pub password_expiration_interval_in_days: Option<u32>,
    pub disable_account_after_failed_login_attempts: bool,
    pub number_of_failed_login_attempts_threshold: u32,
    pub total_minutes_to_disable_user_account: u32,
    /// Reset hashes never expire when unset.
    pub reset_hash_ttl_minutes: Option<u32>,
    pub login_token_ttl_days: u32,
}

impl Default for AuthenticationSettings {
    fn default() -> Self {
        Self {
            identity_column: IdentityColumn::Username,
            store_user_password_changes: true,
            number_of_past_passwords_to_compare_to: 5,
            password_expiration_interval_in_days: None,
            disable_account_after_failed_login_attempts: true,
            number_of_failed_login_attempts_threshold: 5,
            total_minutes_to_disable_user_account: 15,
            reset_hash_ttl_minutes: None,
            login_token_ttl_days: 14, // 2 weeks.
        }
    }
}

impl AuthenticationSettings {
    /// Whether reuse checks run on password changes.
    pub fn checks_password_history(&self) -> bool {
        self.number_of_past_passwords_to_compare_to > 0
    }

    /// Password expiration interval, if enabled.
    pub fn password_expiration(&self) -> Option<chrono::Duration> {
        self.password_expiration_interval_in_days
            .filter(|days| *days > 0)
            .map(|days| chrono::Duration::days(days.into()))
    }

    pub fn lockout_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(
            self.total_minutes_to_disable_user_account.into(),
        )
    }

    pub fn reset_hash_ttl(&self) -> Option<chrono::Duration> {
        self.reset_hash_ttl_minutes
            .map(|minutes| chrono::Duration::minutes(minutes.into()))
    }

    pub fn login_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.login_token_ttl_days.into())
    }
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Argon2 configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Argon2 {
    /// Memory used while hashing.
    pub memory_cost: u32,
    /// Iterations of hash.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
    /// Output hash length.
    pub hash_length: usize,
}

impl Default for Argon2 {
    fn default() -> Self {
        Self {
            memory_cost: 1024 * 64, // 64 MiB.
            iterations: 4,
            parallelism: 2,
            hash_length: 32,
        }
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Application version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Arc<Self> {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            PathBuf::from(DEFAULT_CONFIG_PATH)
        };

        match File::open(&file_path) {
            Ok(file) => match serde_yaml::from_reader::<_, Configuration>(file)
            {
                Ok(mut config) => {
                    config.version = VERSION.to_owned();
                    config.path = file_path;
                    Arc::new(config)
                },
                Err(err) => Arc::new(self.error(err)),
            },
            Err(err) => Arc::new(self.error(err)),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not found or invalid");
        Self {
            version: VERSION.to_owned(),
            ..Default::default()
        }
    }
}
