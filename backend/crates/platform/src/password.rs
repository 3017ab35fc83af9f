//! Password Hashing and Verification
//!
//! - Argon2id hashing with an optional application-wide pepper
//! - Policy checks at registration / reset time (NIST SP 800-63B lengths)
//! - Zeroization of clear text on drop
//! - Optional k-anonymity breach lookup against the HIBP range API

use std::fmt;

use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use argon2::password_hash::SaltString;
use rand::rngs::OsRng;
use sha1::{Digest, Sha1};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// NIST: SHALL be at least 8
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// NIST: SHOULD permit at least 64
pub const MAX_PASSWORD_LENGTH: usize = 128;

const HIBP_RANGE_URL: &str = "https://api.pwnedpasswords.com/range/";

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,

    #[error("This password has appeared in a data breach")]
    Compromised,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    /// Non-fatal: callers log it and carry on
    #[error("Breach check failed: {0}")]
    BreachCheckFailed(String),
}

/// Argon2id cost profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordCost {
    /// OWASP baseline: m=19 MiB, t=2, p=1
    #[default]
    Standard,
    /// Smallest parameters argon2 accepts; only for tests
    Minimal,
}

impl PasswordCost {
    fn hasher(self) -> Result<Argon2<'static>, PasswordHashError> {
        match self {
            PasswordCost::Standard => Ok(Argon2::default()),
            PasswordCost::Minimal => {
                let params = Params::new(
                    Params::MIN_M_COST,
                    Params::MIN_T_COST,
                    Params::MIN_P_COST,
                    None,
                )
                .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
                Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
            }
        }
    }
}

// ============================================================================
// Clear Text Password
// ============================================================================

/// Clear text password, NFKC-normalized and zeroized on drop
///
/// Not `Clone`; `Debug` is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Normalize and check against the password policy (sign up, reset)
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let candidate = Self::for_verification(raw);
        candidate.check_policy()?;
        Ok(candidate)
    }

    /// Normalize only. Sign-in must accept passwords that predate the policy.
    pub fn for_verification(raw: String) -> Self {
        let mut raw = raw;
        let normalized = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    fn check_policy(&self) -> Result<(), PasswordPolicyError> {
        let value = self.0.as_str();
        if value.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let length = value.chars().count();
        if length < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: length,
            });
        }
        if length > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: length,
            });
        }

        if value
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\t' | '\n'))
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_predictable(value) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(())
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Vec<u8> {
        let mut bytes = self.0.as_bytes().to_vec();
        if let Some(pepper) = pepper {
            bytes.extend_from_slice(pepper);
        }
        bytes
    }

    /// Hash with Argon2id and a random 128-bit salt
    pub fn hash(
        &self,
        pepper: Option<&[u8]>,
        cost: PasswordCost,
    ) -> Result<HashedPassword, PasswordHashError> {
        let mut input = self.peppered(pepper);
        let salt = SaltString::generate(OsRng);
        let result = cost
            .hasher()?
            .hash_password(&input, &salt)
            .map(|hash| HashedPassword {
                phc: hash.to_string(),
            })
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()));
        input.zeroize();
        result
    }

    /// Ask HIBP whether this password appeared in a breach
    ///
    /// Only the first five hex digits of the SHA-1 leave the process.
    pub async fn check_breach(&self) -> Result<bool, PasswordHashError> {
        let digest = Sha1::digest(self.0.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{b:02X}")).collect();
        let (prefix, suffix) = hex.split_at(5);

        let response = reqwest::get(format!("{HIBP_RANGE_URL}{prefix}"))
            .await
            .map_err(|e| PasswordHashError::BreachCheckFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PasswordHashError::BreachCheckFailed(format!(
                "API returned status: {}",
                response.status()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| PasswordHashError::BreachCheckFailed(e.to_string()))?;

        Ok(body.lines().any(|line| {
            line.split_once(':')
                .is_some_and(|(candidate, _)| candidate.eq_ignore_ascii_case(suffix))
        }))
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClearTextPassword([REDACTED])")
    }
}

// ============================================================================
// Hashed Password
// ============================================================================

/// Argon2id hash in PHC string format (safe to store)
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    phc: String,
}

impl HashedPassword {
    /// Parse a stored PHC string
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let phc = s.into();
        PasswordHash::new(&phc).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { phc })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.phc
    }

    /// Constant-time verification; the parameters come from the PHC string
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.phc) else {
            return false;
        };
        let mut input = password.peppered(pepper);
        let ok = Argon2::default().verify_password(&input, &parsed).is_ok();
        input.zeroize();
        ok
    }

    /// True when the stored hash is not Argon2id
    pub fn needs_rehash(&self) -> bool {
        PasswordHash::new(&self.phc)
            .map(|parsed| parsed.algorithm != Algorithm::Argon2id.ident())
            .unwrap_or(true)
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword([HASH])")
    }
}

// ============================================================================
// Helpers
// ============================================================================

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890",
    "abcdefgh", "letmein1", "welcome1", "admin123", "iloveyou", "sunshine", "princess",
    "football", "baseball", "trustno1", "qwertyuiop", "changeme",
];

const KEYBOARD_RUNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];

fn is_predictable(password: &str) -> bool {
    let lower = password.to_lowercase();
    let single_repeated = lower
        .chars()
        .next()
        .is_some_and(|first| lower.chars().all(|c| c == first));

    single_repeated
        || is_digit_run(&lower)
        || KEYBOARD_RUNS.iter().any(|run| lower.contains(run))
        || COMMON_PASSWORDS.contains(&lower.as_str())
}

/// "12345678", "98765432"
fn is_digit_run(s: &str) -> bool {
    let Some(digits) = s.chars().map(|c| c.to_digit(10)).collect::<Option<Vec<u32>>>() else {
        return false;
    };
    if digits.len() < 4 {
        return false;
    }
    let ascending = digits.windows(2).all(|w| w[1] == (w[0] + 1) % 10);
    let descending = digits.windows(2).all(|w| w[0] == (w[1] + 1) % 10);
    ascending || descending
}
