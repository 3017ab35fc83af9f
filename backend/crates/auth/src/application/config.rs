//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::crypto::random_bytes;
use platform::password::PasswordCost;
use thiserror::Error;

/// HMAC-SHA256 keys shorter than the digest weaken the signature
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthConfigError {
    #[error("{name} must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort { name: &'static str },

    #[error("Access and refresh secrets must differ")]
    SecretsIdentical,

    #[error("Access token lifetime must be shorter than refresh token lifetime")]
    InvalidLifetimes,
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Signing key for access credentials
    pub access_secret: Vec<u8>,
    /// Signing key for refresh credentials (distinct from the access key)
    pub refresh_secret: Vec<u8>,
    /// Access credential lifetime (1 hour)
    pub access_ttl: Duration,
    /// Refresh credential lifetime (7 days)
    pub refresh_ttl: Duration,
    /// Password reset link lifetime (15 minutes)
    pub reset_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Argon2id cost profile
    pub password_cost: PasswordCost,
    /// Reject passwords found in the HIBP corpus at sign-up/reset
    pub check_breached_passwords: bool,
    /// Frontend origin used to build password reset links
    pub reset_link_base: String,
    /// Whether self sign-up may request the ADMIN role
    pub allow_admin_sign_up: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: vec![0u8; MIN_SECRET_LEN],
            refresh_secret: vec![1u8; MIN_SECRET_LEN],
            access_ttl: Duration::from_secs(3600),           // 1 hour
            refresh_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            reset_ttl: Duration::from_secs(15 * 60),         // 15 minutes
            password_pepper: None,
            password_cost: PasswordCost::Standard,
            check_breached_passwords: false,
            reset_link_base: "http://localhost:5173".to_string(),
            allow_admin_sign_up: false,
        }
    }
}

impl AuthConfig {
    /// Build from explicit secrets (production)
    pub fn from_secrets(
        access_secret: impl Into<Vec<u8>>,
        refresh_secret: impl Into<Vec<u8>>,
    ) -> Result<Self, AuthConfigError> {
        let config = Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Create config with random signing secrets (for development)
    pub fn with_random_secrets() -> Self {
        Self {
            access_secret: random_bytes(MIN_SECRET_LEN),
            refresh_secret: random_bytes(MIN_SECRET_LEN),
            ..Default::default()
        }
    }

    /// Create config for development (random secrets, open admin sign-up)
    pub fn development() -> Self {
        Self {
            check_breached_passwords: false,
            allow_admin_sign_up: true,
            ..Self::with_random_secrets()
        }
    }

    pub fn validate(&self) -> Result<(), AuthConfigError> {
        if self.access_secret.len() < MIN_SECRET_LEN {
            return Err(AuthConfigError::SecretTooShort { name: "ACCESS_TOKEN_SECRET" });
        }
        if self.refresh_secret.len() < MIN_SECRET_LEN {
            return Err(AuthConfigError::SecretTooShort { name: "REFRESH_TOKEN_SECRET" });
        }
        if self.access_secret == self.refresh_secret {
            return Err(AuthConfigError::SecretsIdentical);
        }
        if self.access_ttl >= self.refresh_ttl {
            return Err(AuthConfigError::InvalidLifetimes);
        }
        Ok(())
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.reset_link_base.trim_end_matches('/'),
            token
        )
    }
}
