//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::mail::MailError;
use platform::token::TokenError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    AccountNotFound,

    #[error("User already exists")]
    EmailTaken,

    #[error("Invalid password")]
    InvalidCredentials,

    /// Listings or settlement records still reference the account
    #[error("Account has listings or purchase records and cannot be deleted")]
    AccountInUse,

    /// The account already holds a live session
    #[error("User is already logged in from another device")]
    SessionConflict,

    /// Missing, malformed, expired or superseded credential
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    /// Input rejected by a value object (keeps its message and action)
    #[error("{0}")]
    Validation(AppError),

    #[error("Failed to send mail: {0}")]
    Mail(#[from] MailError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken | AuthError::SessionConflict | AuthError::AccountInUse => {
                ErrorKind::Conflict
            }
            AuthError::InvalidCredentials | AuthError::Unauthorized(_) => ErrorKind::Unauthorized,
            AuthError::Forbidden(_) => ErrorKind::Forbidden,
            AuthError::Validation(e) => e.kind(),
            AuthError::Mail(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(e) => {
                let converted = AppError::new(e.kind(), e.message().to_string());
                match e.action() {
                    Some(action) => converted.with_action(action.to_string()),
                    None => converted,
                }
            }
            AuthError::EmailTaken => AppError::conflict(self.to_string())
                .with_action("Sign in instead, or use a different email"),
            AuthError::SessionConflict => AppError::conflict(self.to_string())
                .with_action("Log out from the other device first"),
            AuthError::AccountInUse => AppError::conflict(self.to_string())
                .with_action("Purchase history is kept; contact an administrator"),
            AuthError::Unauthorized(_) => {
                AppError::unauthorized(self.to_string()).with_action("Please sign in again")
            }
            // 内部詳細はクライアントに返さない
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            AuthError::Mail(_) => AppError::internal("Failed to send password reset email")
                .with_action("Please try again later"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Mail(e) => {
                tracing::error!(error = %e, "Auth mail delivery error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::SessionConflict => {
                tracing::warn!("Sign-in rejected: session already active");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

/// Value-object failures are client errors; anything else is internal
impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.kind().is_client_error() {
            AuthError::Validation(err)
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidTtl => AuthError::Internal(err.to_string()),
            TokenError::Expired => AuthError::Unauthorized("Token has expired"),
            _ => AuthError::Unauthorized("Invalid or expired token"),
        }
    }
}
