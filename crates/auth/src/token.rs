//! Signed session token issuance and verification.
//!
//! Signature integrity is checked by `jsonwebtoken` (HS256 against the
//! process-wide secret); the validity window is checked separately by the
//! pure [`validate_claims`] so callers control the clock and the two failure
//! modes stay distinct.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use banquet_core::UserId;

use crate::config::AuthConfig;
use crate::department::Department;
use crate::error::{AuthError, SessionError, TokenValidationError};
use crate::user::User;

/// An encoded, signed session token.
///
/// Opaque to callers; the session cache persists it verbatim. Deliberately no
/// `Display` impl so a token does not end up in log output by accident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Claims bound into every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the authenticated user.
    pub sub: UserId,
    /// Employee identifier, carried for display purposes only.
    pub employee_id: String,
    /// Display name, carried for display purposes only.
    pub name: String,
    /// Department at issuance time. Authorization re-resolves the department
    /// from the credential store; this claim is advisory.
    pub department: Department,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Issue a signed token for an authenticated user.
///
/// The validity window is `[issued_at, issued_at + token_lifetime]`.
pub fn issue_token(
    user: &User,
    issued_at: DateTime<Utc>,
    config: &AuthConfig,
) -> Result<Token, AuthError> {
    let claims = TokenClaims {
        sub: user.id,
        employee_id: user.employee_id.clone(),
        name: user.name.clone(),
        department: user.department,
        iat: issued_at.timestamp(),
        exp: (issued_at + Duration::seconds(config.token_lifetime_secs as i64)).timestamp(),
    };

    let key = EncodingKey::from_secret(config.signing_secret.as_bytes());
    let header = Header::new(Algorithm::HS256);
    jsonwebtoken::encode(&header, &claims, &key)
        .map(Token)
        .map_err(|e| AuthError::Crypto(format!("token encode: {e}")))
}

/// Verify a token's signature and decode its claims.
///
/// Any decode failure (tampered payload, wrong secret, garbage input) is
/// collapsed into [`SessionError::TokenInvalid`]; the validity window is not
/// checked here.
pub fn decode_token(token: &Token, config: &AuthConfig) -> Result<TokenClaims, SessionError> {
    let key = DecodingKey::from_secret(config.signing_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    // Window checks live in `validate_claims` where the caller supplies `now`.
    validation.validate_exp = false;

    jsonwebtoken::decode::<TokenClaims>(token.as_str(), &key, &validation)
        .map(|data| data.claims)
        .map_err(|_| SessionError::TokenInvalid)
}

/// Deterministically validate a token's time window.
///
/// Note: this validates the *claims* only. Signature verification is done by
/// [`decode_token`].
pub fn validate_claims(
    claims: &TokenClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now.timestamp() < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now.timestamp() > claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_config() -> AuthConfig {
        AuthConfig::new("unit-test-secret")
    }

    fn test_user() -> User {
        User {
            id: UserId::new(),
            employee_id: "COM001".to_string(),
            name: "Bill Boquet".to_string(),
            email: "bill@epic.com".to_string(),
            password_hash: String::new(),
            department: Department::Commercial,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips() {
        let config = test_config();
        let user = test_user();
        let issued_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

        let token = issue_token(&user, issued_at, &config).unwrap();
        let claims = decode_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.department, Department::Commercial);
        assert_eq!(claims.iat, issued_at.timestamp());
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let user = test_user();
        let token = issue_token(&user, Utc::now(), &test_config()).unwrap();

        let other = AuthConfig::new("a-different-secret");
        assert!(matches!(
            decode_token(&token, &other),
            Err(SessionError::TokenInvalid)
        ));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let config = test_config();
        let user = test_user();
        let token = issue_token(&user, Utc::now(), &config).unwrap();

        let mut raw = token.into_string();
        // Flip a character in the payload segment.
        let dot = raw.find('.').unwrap() + 1;
        let byte = raw.as_bytes()[dot];
        let replacement = if byte == b'A' { 'B' } else { 'A' };
        raw.replace_range(dot..dot + 1, &replacement.to_string());

        assert!(matches!(
            decode_token(&Token::from_raw(raw), &config),
            Err(SessionError::TokenInvalid)
        ));
    }

    #[test]
    fn claims_validate_inside_window() {
        let config = test_config();
        let user = test_user();
        let issued_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let token = issue_token(&user, issued_at, &config).unwrap();
        let claims = decode_token(&token, &config).unwrap();

        assert!(validate_claims(&claims, issued_at).is_ok());
        assert!(validate_claims(&claims, issued_at + Duration::hours(23)).is_ok());
    }

    #[test]
    fn claims_expire_after_window() {
        let config = test_config();
        let user = test_user();
        let issued_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let token = issue_token(&user, issued_at, &config).unwrap();
        let claims = decode_token(&token, &config).unwrap();

        let after_expiry = issued_at + Duration::hours(24) + Duration::seconds(1);
        assert_eq!(
            validate_claims(&claims, after_expiry),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn claims_issued_in_the_future_are_rejected() {
        let claims = TokenClaims {
            sub: UserId::new(),
            employee_id: "COM001".into(),
            name: "Bill".into(),
            department: Department::Commercial,
            iat: 2_000,
            exp: 3_000,
        };
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let claims = TokenClaims {
            sub: UserId::new(),
            employee_id: "COM001".into(),
            name: "Bill".into(),
            department: Department::Commercial,
            iat: 3_000,
            exp: 3_000,
        };
        let now = Utc.timestamp_opt(3_000, 0).unwrap();
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
