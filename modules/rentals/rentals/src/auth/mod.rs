//! Credential handling: password hashing and JWT issue/verify.
//!
//! Hashing is delegated to bcrypt and token handling to `jsonwebtoken`;
//! nothing cryptographic is implemented here.

mod jwt;
mod password;

pub use jwt::{Claims, TokenService};
pub use password::PasswordHasher;

/// Failures of the credential layer.
///
/// Token rejections are deliberately coarse: callers only need to know
/// the token was not acceptable, not why.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("password hashing failed")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("failed to issue token")]
    Issue(#[source] jsonwebtoken::errors::Error),
}
