//! Authentication services implementing the policy.

pub mod authentication;
pub mod credential_store;
pub mod login_attempt;
pub mod login_token;
pub mod password_history;
pub mod password_reset;

pub use authentication::*;
pub use credential_store::*;
pub use login_attempt::*;
pub use login_token::*;
pub use password_history::*;
pub use password_reset::*;

use std::sync::Arc;

use crate::ports::{
    Clock, Hasher, LoginAttemptRepository, PasswordHasher,
    PastPasswordRepository, SecureRandom, UserRepository,
};

/// Outside world handed to the services at construction.
#[derive(Clone)]
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub past_passwords: Arc<dyn PastPasswordRepository>,
    pub login_attempts: Arc<dyn LoginAttemptRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub hasher: Arc<dyn Hasher>,
    pub random: Arc<dyn SecureRandom>,
    pub clock: Arc<dyn Clock>,
}
