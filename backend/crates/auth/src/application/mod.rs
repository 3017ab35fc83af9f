//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod manage_account;
pub mod password_reset;
pub mod refresh;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod token_authority;

// Re-exports
pub use config::{AuthConfig, AuthConfigError};
pub use manage_account::{ManageAccountUseCase, UpdateProfileInput};
pub use password_reset::PasswordResetUseCase;
pub use refresh::RefreshUseCase;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use token_authority::{ResetGrant, TokenAuthority, TokenKind};
