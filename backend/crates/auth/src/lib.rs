//! Auth (Token Authority) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Accounts, value objects, repository traits
//! - `application/` - Use cases and the token authority
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router, role gate
//!
//! ## Features
//! - Sign up / sign in with email + password
//! - Access (1h) and refresh (7d) credentials signed with distinct secrets
//! - Single active session per account, rotated on every refresh
//! - Password reset by mailed, single-use link
//! - Role gate (`USER`, `ADMIN`) shared with the market routes
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B policy)
//! - A refresh credential is honoured only while it equals the stored
//!   session marker
//! - Reset links are bound to the current password hash

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::token_authority::{TokenAuthority, TokenKind};
pub use domain::entity::credential::AuthenticatedAccount;
pub use domain::value_object::account_role::{AccountRole, RoleSet};
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryAccountRepository, PgAccountRepository};
pub use presentation::middleware::{AccessGate, require_roles};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
