//! Signed Tokens
//!
//! Compact HS256 JWS (`header.payload.signature`, each segment unpadded
//! base64url). The payload is the caller's claim body flattened together with
//! the registered claims `iat`, `exp` and `jti`.
//!
//! ## Security
//! - The header is fixed; any other `alg` is rejected before the signature
//!   is checked
//! - Signature comparison is constant time
//! - `exp` is enforced against the caller-supplied clock

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{from_base64url, hmac_sha256, random_bytes, to_base64url, verify_hmac_sha256};

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

/// Token errors
///
/// Every variant means "do not trust this token"; callers typically collapse
/// them into a single `Unauthorized`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token is malformed")]
    Malformed,

    #[error("Unsupported token algorithm")]
    UnsupportedAlgorithm,

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token claims are invalid: {0}")]
    InvalidClaims(String),

    #[error("Token lifetime is out of range")]
    InvalidTtl,
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Decoded claims: the caller's body plus registered claims
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claims<T> {
    #[serde(flatten)]
    pub body: T,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
    /// Unique token id, so two tokens minted in the same second differ
    pub jti: String,
}

impl<T> Claims<T> {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[derive(Serialize)]
struct ClaimsRef<'a, T> {
    #[serde(flatten)]
    body: &'a T,
    iat: i64,
    exp: i64,
    jti: &'a str,
}

/// A freshly signed token and its expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Sign `body` with `secret`, valid for `ttl` from `now`
pub fn sign<T: Serialize>(
    body: &T,
    secret: &[u8],
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<SignedToken, TokenError> {
    let ttl = chrono::Duration::from_std(ttl).map_err(|_| TokenError::InvalidTtl)?;
    let expires_at = now.checked_add_signed(ttl).ok_or(TokenError::InvalidTtl)?;
    let jti = to_base64url(&random_bytes(16));

    let header = serde_json::to_vec(&Header {
        alg: ALGORITHM.to_string(),
        typ: TOKEN_TYPE.to_string(),
    })
    .map_err(|e| TokenError::InvalidClaims(e.to_string()))?;

    let payload = serde_json::to_vec(&ClaimsRef {
        body,
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        jti: &jti,
    })
    .map_err(|e| TokenError::InvalidClaims(e.to_string()))?;

    let signing_input = format!("{}.{}", to_base64url(&header), to_base64url(&payload));
    let signature = hmac_sha256(secret, signing_input.as_bytes());

    Ok(SignedToken {
        token: format!("{}.{}", signing_input, to_base64url(&signature)),
        expires_at: Utc
            .timestamp_opt(expires_at.timestamp(), 0)
            .single()
            .ok_or(TokenError::InvalidTtl)?,
    })
}

/// Verify signature and expiry, then decode the claims
pub fn verify<T: DeserializeOwned>(
    token: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<Claims<T>, TokenError> {
    let mut segments = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };

    let header: Header = from_base64url(header_b64)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .ok_or(TokenError::Malformed)?;
    if header.alg != ALGORITHM {
        return Err(TokenError::UnsupportedAlgorithm);
    }

    let signature = from_base64url(signature_b64).map_err(|_| TokenError::Malformed)?;
    let signing_input = &token[..header_b64.len() + 1 + payload_b64.len()];
    if !verify_hmac_sha256(secret, signing_input.as_bytes(), &signature) {
        return Err(TokenError::BadSignature);
    }

    let payload = from_base64url(payload_b64).map_err(|_| TokenError::Malformed)?;
    let claims: Claims<T> = serde_json::from_slice(&payload)
        .map_err(|e| TokenError::InvalidClaims(e.to_string()))?;

    if now.timestamp() >= claims.exp {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Body {
        sub: String,
        role: String,
    }

    const SECRET: &[u8] = b"an-access-secret-of-sufficient-length";

    fn body() -> Body {
        Body {
            sub: "8c3e3a9b-0000-4000-8000-000000000001".into(),
            role: "USER".into(),
        }
    }

    #[test]
    fn test_round_trip_before_expiry() {
        let now = Utc::now();
        let signed = sign(&body(), SECRET, Duration::from_secs(3600), now).unwrap();
        let claims: Claims<Body> = verify(&signed.token, SECRET, now).unwrap();

        assert_eq!(claims.body, body());
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.expires_at(), signed.expires_at);
    }

    #[test]
    fn test_expired_after_ttl() {
        let now = Utc::now();
        let signed = sign(&body(), SECRET, Duration::from_secs(60), now).unwrap();

        let later = now + chrono::Duration::seconds(60);
        assert_eq!(
            verify::<Body>(&signed.token, SECRET, later),
            Err(TokenError::Expired)
        );

        let just_before = now + chrono::Duration::seconds(59);
        assert!(verify::<Body>(&signed.token, SECRET, just_before).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = Utc::now();
        let signed = sign(&body(), SECRET, Duration::from_secs(60), now).unwrap();
        assert_eq!(
            verify::<Body>(&signed.token, b"a-refresh-secret", now),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let now = Utc::now();
        let signed = sign(&body(), SECRET, Duration::from_secs(60), now).unwrap();
        let parts: Vec<&str> = signed.token.split('.').collect();

        let forged_body = Body {
            sub: body().sub,
            role: "ADMIN".into(),
        };
        let forged_payload = serde_json::to_vec(&serde_json::json!({
            "sub": forged_body.sub,
            "role": forged_body.role,
            "iat": now.timestamp(),
            "exp": now.timestamp() + 60,
            "jti": "x",
        }))
        .unwrap();
        let forged = format!("{}.{}.{}", parts[0], to_base64url(&forged_payload), parts[2]);

        assert_eq!(
            verify::<Body>(&forged, SECRET, now),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_alg_none_rejected() {
        let header = to_base64url(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = to_base64url(br#"{"sub":"a","role":"ADMIN","iat":0,"exp":9999999999,"jti":"x"}"#);
        let token = format!("{header}.{payload}.");
        assert_eq!(
            verify::<Body>(&token, SECRET, Utc::now()),
            Err(TokenError::UnsupportedAlgorithm)
        );
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        #[derive(Serialize)]
        struct OnlySubject {
            sub: String,
        }

        let now = Utc::now();
        let signed = sign(
            &OnlySubject { sub: "a".into() },
            SECRET,
            Duration::from_secs(60),
            now,
        )
        .unwrap();

        assert!(matches!(
            verify::<Body>(&signed.token, SECRET, now),
            Err(TokenError::InvalidClaims(_))
        ));
    }

    #[test]
    fn test_malformed_tokens() {
        let now = Utc::now();
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.**"] {
            assert_eq!(
                verify::<Body>(token, SECRET, now),
                Err(TokenError::Malformed),
                "token {token:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_tokens_are_unique() {
        let now = Utc::now();
        let a = sign(&body(), SECRET, Duration::from_secs(60), now).unwrap();
        let b = sign(&body(), SECRET, Duration::from_secs(60), now).unwrap();
        assert_ne!(a.token, b.token);
    }
}
