//! Secure random generation using OS RNG.

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::Result;
use crate::ports::SecureRandom;

/// OS-based secure random generator.
pub struct OsRngRandom;

impl OsRngRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OsRngRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureRandom for OsRngRandom {
    fn random_bytes(&self, length: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; length];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(bytes)
    }
}
