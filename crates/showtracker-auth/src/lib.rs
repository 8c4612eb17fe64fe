//! Credentials for ShowTracker accounts
//!
//! Password hashing is delegated to bcrypt; access and refresh tokens are
//! HS256 JWTs.

mod error;
mod password;
mod token;

pub use error::AuthError;
pub use password::PasswordHasher;
pub use token::{TokenClaims, TokenIssuer, TokenKind};
