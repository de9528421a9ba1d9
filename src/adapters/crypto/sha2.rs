//! SHA-256 hasher for non-password data (tokens, seeds).

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::ports::Hasher;

/// SHA-256 hasher with pepper.
pub struct Sha256Hasher {
    pepper: Zeroizing<Vec<u8>>,
}

impl Sha256Hasher {
    pub fn new(pepper: impl AsRef<[u8]>) -> Self {
        Self {
            pepper: Zeroizing::new(pepper.as_ref().to_vec()),
        }
    }
}

impl Hasher for Sha256Hasher {
    fn digest(&self, data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&*self.pepper);
        hasher.update(data);
        let result = hasher.finalize();

        hex::encode(result)
    }

    fn keyed_digest(&self, key: &[u8], data: &[u8]) -> Result<String> {
        let mut mac = Hmac::<Sha256>::new_from_slice(key)
            .map_err(|err| Error::Internal(err.to_string().into()))?;
        mac.update(&self.pepper);
        mac.update(data);

        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}
