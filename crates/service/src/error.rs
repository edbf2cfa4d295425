//! The service-level error taxonomy.

use thiserror::Error;

use banquet_auth::{AuthError, Deny, SessionError, SessionStoreError};
use banquet_core::{DomainError, StoreError};

/// Structured failure surfaced to the command surface.
///
/// Authentication, session, and permission errors are terminal for the call
/// and never retried here; [`CrmError::StoreUnavailable`] is the only class
/// eligible for a bounded retry, which belongs to the caller.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no active session; please login")]
    NotAuthenticated,

    #[error("session token has expired; please login again")]
    TokenExpired,

    #[error("session token is invalid")]
    TokenInvalid,

    #[error("user no longer exists")]
    UserNotFound,

    #[error("permission denied: {0}")]
    PermissionDenied(Deny),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// An unhandled failure, already reported to the audit sink.
    #[error("internal error")]
    Internal,
}

impl From<StoreError> for CrmError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => CrmError::NotFound,
            StoreError::Conflict(detail) => CrmError::PreconditionFailed(detail),
            StoreError::Unavailable(detail) => CrmError::StoreUnavailable(detail),
        }
    }
}

impl From<AuthError> for CrmError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => CrmError::InvalidCredentials,
            AuthError::Crypto(detail) => {
                tracing::error!(detail = %detail, "cryptography failure");
                CrmError::Internal
            }
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<SessionError> for CrmError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::TokenInvalid => CrmError::TokenInvalid,
            SessionError::TokenExpired => CrmError::TokenExpired,
            SessionError::UserNotFound => CrmError::UserNotFound,
            SessionError::Store(e) => e.into(),
        }
    }
}

impl From<SessionStoreError> for CrmError {
    fn from(err: SessionStoreError) -> Self {
        CrmError::StoreUnavailable(format!("session cache: {err}"))
    }
}

impl From<DomainError> for CrmError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvariantViolation(detail) => CrmError::InvariantViolation(detail),
            DomainError::Validation(detail) | DomainError::InvalidId(detail) => {
                CrmError::InvariantViolation(detail)
            }
            DomainError::PreconditionFailed(detail) => CrmError::PreconditionFailed(detail),
            DomainError::NotFound => CrmError::NotFound,
        }
    }
}

impl From<Deny> for CrmError {
    fn from(deny: Deny) -> Self {
        match deny {
            // The signed-before-event rule surfaces as a precondition failure,
            // not a permission problem: the actor may act, the target may not.
            Deny::PreconditionFailed => {
                CrmError::PreconditionFailed("contract must be signed first".to_string())
            }
            other => CrmError::PermissionDenied(other),
        }
    }
}
