//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC-SHA256, Base64)
//! - Signed, expiring tokens (HS256 compact JWS)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Rate limiting infrastructure
//! - Client IP / bearer token extraction
//! - Outbound mail dispatch

pub mod client;
pub mod crypto;
pub mod mail;
pub mod password;
pub mod rate_limit;
pub mod token;
