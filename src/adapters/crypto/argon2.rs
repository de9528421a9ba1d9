//! Argon2id password hasher implementation.

use argon2::password_hash::{
    PasswordHash, PasswordHasher as Argon2PasswordHasherTrait,
    PasswordVerifier, SaltString,
};
use argon2::{Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::config::Argon2 as ArgonConfig;
use crate::domain::Password;
use crate::error::{Error, Result};
use crate::ports::PasswordHasher;

/// Argon2id password hasher adapter.
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Create a new Argon2 hasher with custom parameters.
    pub fn new(config: Option<ArgonConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();

        let params = Params::new(
            config.memory_cost,
            config.iterations,
            config.parallelism,
            Some(config.hash_length),
        )
        .map_err(|err| Error::Argon2(err.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_str().as_bytes(), &salt)
            .map_err(|err| Error::Argon2(err.to_string()))?;

        Ok(hash.to_string())
    }

    fn verify(&self, password: &Password, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2()
            .verify_password(password.as_str().as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::hasher;

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let password = Password::new("StRong_PaÂ§$W0rD");
        let hash = hasher.hash(&password).unwrap();

        assert!(hash.starts_with("$argon2id$v=19$"));
        assert!(hasher.verify(&password, &hash));
        assert!(!hasher.verify(&Password::new("StRong_PaÂ§$W0rd"), &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = hasher();
        let password = Password::new("correct horse battery");

        let first = hasher.hash(&password).unwrap();
        let second = hasher.hash(&password).unwrap();

        assert_ne!(first, second);
        assert!(!hasher.compare(&first, &second));
        assert!(hasher.compare(&first, &first.clone()));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let hasher = hasher();
        assert!(!hasher.verify(&Password::new("whatever1"), ""));
        assert!(!hasher.verify(&Password::new("whatever1"), "not-a-phc"));
    }

    #[test]
    fn test_invalid_params() {
        let res = Argon2PasswordHasher::new(Some(ArgonConfig {
            memory_cost: 1,
            iterations: 0,
            parallelism: 1,
            hash_length: 32,
        }));
        assert!(matches!(res, Err(Error::Argon2(_))));
    }
}
