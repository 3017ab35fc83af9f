//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of marketplace vocabulary:
//! - Common error types, severities and result aliases
//! - Typed identifiers for accounts, projects, transactions and feedback
//! - `Money`, the non-negative decimal used by wallets and prices
//! - The JSON success envelope shared by every HTTP module
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod money;
pub mod response;
