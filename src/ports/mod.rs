//! These traits define what the authentication core needs from the outside
//! world.

pub mod clock;
pub mod crypto;
pub mod repository;

pub use clock::*;
pub use crypto::*;
pub use repository::*;
