//! Password logic.

use validator::ValidationErrors;
use zeroize::Zeroizing;

use crate::error::field_error;

/// Value object of a cleartext password.
///
/// Memory is wiped on drop.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Maximum password length.
    pub const MAX_LENGTH: usize = 255;
    /// Minimum password length.
    pub const MIN_LENGTH: usize = 8;

    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Add length violations to `errors`.
    pub fn validate(&self, errors: &mut ValidationErrors) {
        let len = self.0.chars().count();

        if len < Self::MIN_LENGTH {
            errors.add(
                "password",
                field_error(
                    "too_short",
                    format!(
                        "Password must be at least {} characters.",
                        Self::MIN_LENGTH
                    ),
                ),
            );
        } else if len > Self::MAX_LENGTH {
            errors.add(
                "password",
                field_error(
                    "too_long",
                    format!(
                        "Password must be at most {} characters.",
                        Self::MAX_LENGTH
                    ),
                ),
            );
        }
    }

    /// Returns the same string as a string slice `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        let mut errors = ValidationErrors::new();
        Password::new("short").validate(&mut errors);
        assert!(errors.field_errors().contains_key("password"));

        let mut errors = ValidationErrors::new();
        Password::new("a".repeat(Password::MAX_LENGTH + 1))
            .validate(&mut errors);
        assert!(errors.field_errors().contains_key("password"));

        let mut errors = ValidationErrors::new();
        Password::new("correct horse").validate(&mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = Password::new("hunter22hunter22");
        assert!(!format!("{password:?}").contains("hunter22"));
    }
}
