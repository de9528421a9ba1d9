//! Warden is a password authentication core: credential storage, reset
//! hashes, persistent login tokens, password history and login lockout.

#![forbid(unsafe_code)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod telemetry;
pub mod usecases;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use sqlx::PgPool;

use crate::adapters::persistence::postgres;
use crate::adapters::{
    Argon2PasswordHasher, OsRngRandom, PgLoginAttemptRepository,
    PgPastPasswordRepository, PgUserRepository, Sha256Hasher, SystemClock,
};
use crate::error::{Error, Result, ToInternal};
use crate::usecases::{AuthenticationService, Ports};

/// Environment variable holding the pepper mixed into every digest.
pub const PEPPER_ENV: &str = "PEPPER";

/// Application state shared by every caller.
#[derive(Clone)]
pub struct Warden {
    pub config: Arc<config::Configuration>,
    pub postgres: PgPool,
    pub authentication: Arc<AuthenticationService>,
}

/// Connect PostgreSQL from the `postgres` configuration entry.
pub async fn connect(config: &config::Configuration) -> Result<PgPool> {
    let Some(cfg) = &config.postgres else {
        tracing::error!("missing `postgres` entry on `config.yaml` file");
        return Err(Error::InvalidState("postgres is not configured"));
    };

    postgres::connect(
        &cfg.address,
        cfg.username
            .as_deref()
            .unwrap_or(postgres::DEFAULT_CREDENTIALS),
        cfg.password
            .as_deref()
            .unwrap_or(postgres::DEFAULT_CREDENTIALS),
        cfg.database
            .as_deref()
            .unwrap_or(postgres::DEFAULT_DATABASE_NAME),
        cfg.pool_size.unwrap_or(postgres::DEFAULT_POOL_SIZE),
    )
    .await
}

/// Initialize the application state.
pub async fn initialize_state() -> Result<Warden> {
    // read configuration file. let it in memory.
    let config = config::Configuration::default().read();

    let pool = connect(&config).await?;

    // execute migrations scripts on start.
    postgres::migrate(&pool).await?;

    let pepper = std::env::var(PEPPER_ENV)
        .inspect_err(|_| {
            tracing::error!("missing `{PEPPER_ENV}` environment variable")
        })
        .catch()?;

    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let ports = Ports {
        users,
        past_passwords: Arc::new(PgPastPasswordRepository::new(
            pool.clone(),
        )),
        login_attempts: Arc::new(PgLoginAttemptRepository::new(
            pool.clone(),
        )),
        password_hasher: Arc::new(Argon2PasswordHasher::new(
            config.argon2.clone(),
        )?),
        hasher: Arc::new(Sha256Hasher::new(pepper)),
        random: Arc::new(OsRngRandom::new()),
        clock: Arc::new(SystemClock::new()),
    };

    telemetry::describe_metrics();

    let authentication = Arc::new(AuthenticationService::new(
        config.authentication.clone(),
        ports,
    ));

    Ok(Warden {
        config,
        postgres: pool,
        authentication,
    })
}
