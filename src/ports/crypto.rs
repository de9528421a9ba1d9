//! Interfaces for cryptographic operations.

use crate::domain::Password;
use crate::error::Result;

/// Port for password hashing operations.
pub trait PasswordHasher: Send + Sync {
    /// Hash a password using a salted, slow algorithm.
    fn hash(&self, password: &Password) -> Result<String>;

    /// Verify a password against a stored hash.
    ///
    /// A malformed hash never verifies.
    fn verify(&self, password: &Password, hash: &str) -> bool;

    /// Compare two digests without leaking where they differ.
    fn compare(&self, a: &str, b: &str) -> bool {
        constant_time_eq::constant_time_eq(a.as_bytes(), b.as_bytes())
    }
}

/// Port for deterministic hashing (tokens, seeds).
pub trait Hasher: Send + Sync {
    /// Compute a hex digest of the input.
    fn digest(&self, data: &[u8]) -> String;

    /// Compute a hex digest of `data` keyed with `key`.
    fn keyed_digest(&self, key: &[u8], data: &[u8]) -> Result<String>;
}

/// Port for secure random generation.
pub trait SecureRandom: Send + Sync {
    /// Generate random bytes.
    fn random_bytes(&self, length: usize) -> Result<Vec<u8>>;

    /// Generate `byte_length` random bytes, hex encoded.
    fn random_hex(&self, byte_length: usize) -> Result<String> {
        Ok(hex::encode(self.random_bytes(byte_length)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl PasswordHasher for Plain {
        fn hash(&self, password: &Password) -> Result<String> {
            Ok(password.as_str().to_owned())
        }

        fn verify(&self, password: &Password, hash: &str) -> bool {
            password.as_str() == hash
        }
    }

    #[test]
    fn test_compare() {
        assert!(Plain.compare("abcdef", "abcdef"));
        assert!(!Plain.compare("abcdef", "abcdeF"));
        assert!(!Plain.compare("abcdef", "abcde"));
        assert!(Plain.compare("", ""));
    }
}
