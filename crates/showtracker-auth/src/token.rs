use std::sync::Arc;
use std::time::Duration;

use jwt_compact::alg::{Hs256, Hs256Key};
use jwt_compact::{AlgorithmExt, Claims, Header, TimeOptions, UntrustedToken, ValidationError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use showtracker_config::AuthConfig;

use crate::AuthError;

/// Purpose of a token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short lived, sent as `Authorization: Bearer`
    #[default]
    Access,
    /// Long lived, only exchanged for new access tokens
    Refresh,
}

impl TokenKind {
    #[allow(clippy::trivially_copy_pass_by_ref)]
    fn is_access(&self) -> bool {
        *self == Self::Access
    }
}

/// Custom claims carried by every ShowTracker token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Owning user's record id
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "iss")]
    pub issuer: String,
    #[serde(rename = "aud")]
    pub audience: String,
    /// Omitted for access tokens
    #[serde(rename = "type", default, skip_serializing_if = "TokenKind::is_access")]
    pub kind: TokenKind,
}

/// Signs and verifies HS256 tokens
#[derive(Clone)]
pub struct TokenIssuer {
    key: Arc<Hs256Key>,
    issuer: String,
    audience: String,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
}

impl TokenIssuer {
    /// Create an issuer with explicit settings
    ///
    /// # Errors
    ///
    /// Returns an error if a lifetime does not fit a signed 64-bit
    /// millisecond count
    pub fn new(
        secret: &SecretString,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            key: Arc::new(Hs256Key::new(secret.expose_secret().as_bytes())),
            issuer: issuer.into(),
            audience: audience.into(),
            access_ttl: chrono::Duration::from_std(access_ttl)?,
            refresh_ttl: chrono::Duration::from_std(refresh_ttl)?,
        })
    }

    /// Create an issuer from the `[auth]` section
    ///
    /// # Errors
    ///
    /// Returns an error if the configured lifetimes are invalid
    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        Self::new(
            &config.jwt_secret,
            config.issuer.clone(),
            config.audience.clone(),
            config.token_ttl_duration()?,
            config.refresh_token_ttl_duration()?,
        )
    }

    /// Sign a token of `kind` for `user_id`
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if the claims cannot be serialized
    pub fn issue(&self, user_id: &str, kind: TokenKind) -> Result<String, AuthError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims::new(TokenClaims {
            user_id: user_id.to_owned(),
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
            kind,
        })
        .set_duration_and_issuance(&TimeOptions::default(), ttl);

        Hs256
            .token(&Header::empty(), &claims, self.key.as_ref())
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Validate a raw token and return its claims
    ///
    /// Checks the signature, expiry, issuer, audience and that the token
    /// is of the `expected` kind.
    ///
    /// # Errors
    ///
    /// Returns the `AuthError` describing the first failed check
    pub fn verify(&self, raw: &str, expected: TokenKind) -> Result<TokenClaims, AuthError> {
        let untrusted = UntrustedToken::new(raw).map_err(|e| AuthError::Malformed(e.to_string()))?;

        let token = Hs256
            .validator::<TokenClaims>(self.key.as_ref())
            .validate(&untrusted)
            .map_err(|e| AuthError::Invalid(e.to_string()))?;

        let claims = token
            .claims()
            .validate_expiration(&TimeOptions::default())
            .map_err(|e| match e {
                ValidationError::Expired => AuthError::Expired,
                other => AuthError::Invalid(other.to_string()),
            })?;

        let custom = &claims.custom;

        if custom.issuer != self.issuer || custom.audience != self.audience {
            return Err(AuthError::WrongAudience);
        }

        if custom.kind != expected {
            return Err(AuthError::WrongTokenKind);
        }

        Ok(custom.clone())
    }
}
