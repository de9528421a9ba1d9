//! Implementations of the ports.

pub mod clock;
pub mod crypto;
pub mod persistence;

pub use clock::*;
pub use crypto::*;
pub use persistence::*;
