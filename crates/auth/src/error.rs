//! Authentication and session error types.

use thiserror::Error;

use banquet_core::StoreError;

/// Login-time failure.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password collapse into this single kind so a
    /// caller cannot enumerate accounts.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A cryptographic primitive failed (malformed stored hash, signing error).
    #[error("cryptography error: {0}")]
    Crypto(String),

    /// The credential store was unreachable.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure while validating a presented session token.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Signature mismatch or undecodable token (tampering, wrong secret).
    #[error("session token is invalid")]
    TokenInvalid,

    /// The token was genuine but its validity window has closed. Distinct from
    /// [`SessionError::TokenInvalid`] so callers can prompt a re-login.
    #[error("session token has expired")]
    TokenExpired,

    /// The token's subject no longer exists in the credential store. Tokens are
    /// not a source of truth for membership; the store is.
    #[error("user no longer exists")]
    UserNotFound,

    /// The credential store was unreachable.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Deterministic validation of a token's time window.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}
