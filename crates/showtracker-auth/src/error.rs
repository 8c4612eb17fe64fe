/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Token is not a well-formed JWT
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Signature or claim validation failed
    #[error("invalid token: {0}")]
    Invalid(String),

    /// `exp` is in the past
    #[error("token expired")]
    Expired,

    /// `iss` or `aud` does not match this deployment
    #[error("token issued for another audience")]
    WrongAudience,

    /// A refresh token was presented where an access token is required, or
    /// the other way round
    #[error("unexpected token type")]
    WrongTokenKind,

    /// Token could not be signed
    #[error("token signing failed: {0}")]
    Signing(String),

    /// bcrypt failed or the blocking task was lost
    #[error("password hashing failed: {0}")]
    Hashing(String),
}
