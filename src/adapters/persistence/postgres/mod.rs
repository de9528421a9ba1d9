//! PostgreSQL repositories.

mod login_attempt_repository;
mod models;
mod past_password_repository;
mod user_repository;

pub use login_attempt_repository::PgLoginAttemptRepository;
pub use past_password_repository::PgPastPasswordRepository;
pub use user_repository::PgUserRepository;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::{Error, Result};

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "warden";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Connect a pool of PostgreSQL connections.
pub async fn connect(
    hostname: &str,
    username: &str,
    password: &str,
    db: &str,
    pool: u32,
) -> Result<PgPool> {
    let addr = format!("postgres://{username}:{password}@{hostname}/{db}");
    let postgres = PgPoolOptions::new()
        .max_connections(pool)
        .connect(&addr)
        .await?;

    tracing::info!(%hostname, %db, "postgres connected");

    Ok(postgres)
}

/// Execute migrations scripts.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}

/// Map unique violations to [`Error::UniqueViolation`].
fn map_unique(err: sqlx::Error) -> Error {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return Error::UniqueViolation {
                constraint: db_err.constraint().unwrap_or_default().to_owned(),
            };
        }
    }

    Error::Sql(err)
}
