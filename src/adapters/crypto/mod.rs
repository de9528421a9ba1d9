//! Cryptographic adapters.

mod argon2;
mod random;
mod sha2;

pub use self::argon2::Argon2PasswordHasher;
pub use self::random::OsRngRandom;
pub use self::sha2::Sha256Hasher;
