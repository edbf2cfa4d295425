//! Authentication configuration.

/// Configuration for token issuance and verification.
///
/// The signing secret is process-wide state: loaded once at startup by the
/// configuration layer, read-only afterwards, and never persisted alongside
/// any token.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing session tokens.
    pub signing_secret: String,
    /// Session token lifetime in seconds (default: 86_400 = 24 hours).
    pub token_lifetime_secs: u64,
}

impl AuthConfig {
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            ..Self::default()
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_secret: String::new(),
            token_lifetime_secs: 86_400,
        }
    }
}
