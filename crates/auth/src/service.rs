//! Authentication and session validation services.
//!
//! Generic over the [`UserRepository`] port so this layer has no dependency
//! on any storage crate.

use chrono::{DateTime, Utc};

use crate::config::AuthConfig;
use crate::error::{AuthError, SessionError, TokenValidationError};
use crate::identity::Identity;
use crate::password;
use crate::token::{self, Token};
use crate::user::{UserRepository, normalize_email};

/// Verifies login attempts and issues session tokens.
///
/// Persisting the issued token to the session cache is the caller's
/// responsibility.
pub struct Authenticator<'a, R> {
    repo: &'a R,
    config: &'a AuthConfig,
}

impl<'a, R: UserRepository> Authenticator<'a, R> {
    pub fn new(repo: &'a R, config: &'a AuthConfig) -> Self {
        Self { repo, config }
    }

    /// Authenticate an email/password pair and issue a signed token.
    ///
    /// "No such user" and "wrong password" are indistinguishable to the
    /// caller: both surface as [`AuthError::InvalidCredentials`].
    pub fn authenticate(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Token, AuthError> {
        let email = match normalize_email(email) {
            Ok(email) => email,
            Err(_) => return Err(AuthError::InvalidCredentials),
        };

        let Some(user) = self.repo.user_by_email(&email)? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!(user = %user.id, "credentials verified");
        token::issue_token(&user, now, self.config)
    }
}

/// Recovers a validated [`Identity`] from a presented token.
pub struct SessionValidator<'a, R> {
    repo: &'a R,
    config: &'a AuthConfig,
}

impl<'a, R: UserRepository> SessionValidator<'a, R> {
    pub fn new(repo: &'a R, config: &'a AuthConfig) -> Self {
        Self { repo, config }
    }

    /// Validate signature, window, and subject existence, in that order.
    ///
    /// The subject is re-resolved against the credential store so a deleted
    /// user's token is rejected immediately, and the department in the
    /// returned identity is the store's, not the token's.
    pub fn validate(&self, token: &Token, now: DateTime<Utc>) -> Result<Identity, SessionError> {
        let claims = token::decode_token(token, self.config)?;

        token::validate_claims(&claims, now).map_err(|e| match e {
            TokenValidationError::Expired => SessionError::TokenExpired,
            TokenValidationError::NotYetValid | TokenValidationError::InvalidTimeWindow => {
                SessionError::TokenInvalid
            }
        })?;

        let user = self
            .repo
            .user_by_id(claims.sub)?
            .ok_or(SessionError::UserNotFound)?;

        Ok(Identity {
            user_id: user.id,
            department: user.department,
            name: user.name,
        })
    }
}
