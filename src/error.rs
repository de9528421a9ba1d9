//! Error handler for warden.

use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

pub type Result<T> = std::result::Result<T, Error>;

/// Enum representing every failure the authentication core can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no matching record")]
    NotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("account is temporarily locked")]
    LockedOut,
    #[error("invalid state, {0}")]
    InvalidState(&'static str),

    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),
    #[error("unique constraint `{constraint}` violated")]
    UniqueViolation { constraint: String },

    #[error("SQL request failed: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("argon2 error: {0}")]
    Argon2(String),
    #[error("random generator failed: {0}")]
    Random(#[from] rand::Error),

    #[error("internal error")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Build a [`Error::Validation`] holding a single field error.
    pub fn field(
        field: &'static str,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, field_error(code, message));
        Self::Validation(errors)
    }

    /// Field errors when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Create a coded [`ValidationError`] with a human readable message.
pub fn field_error(
    code: &'static str,
    message: impl Into<String>,
) -> ValidationError {
    let message: String = message.into();
    ValidationError::new(code).with_message(message.into())
}

/// Wrap foreign errors as [`Error::Internal`].
pub trait ToInternal<T> {
    fn catch(self) -> Result<T>;
}

impl<T, E> ToInternal<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn catch(self) -> Result<T> {
        self.map_err(|e| Error::Internal(Box::new(e)))
    }
}
