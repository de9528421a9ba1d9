//! Records handled by the authentication core.

pub mod history;
pub mod login_attempt;
pub mod password;
pub mod user;

pub use history::*;
pub use login_attempt::*;
pub use password::*;
pub use user::*;
