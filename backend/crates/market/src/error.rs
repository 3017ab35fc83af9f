//! Market Error Types
//!
//! Market-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::money::MoneyError;
use thiserror::Error;

/// Market-specific result type alias
pub type MarketResult<T> = Result<T, MarketError>;

/// Market-specific error variants
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Project not found")]
    ProjectNotFound,

    #[error("Buyer not found")]
    BuyerNotFound,

    #[error("Buyer does not have enough funds")]
    InsufficientFunds,

    /// The configured platform account is missing
    #[error("Admin not found")]
    PlatformAccountNotFound,

    #[error("Owner not found")]
    OwnerNotFound,

    #[error("Transaction not found")]
    TransactionNotFound,

    #[error("Feedback not found.")]
    FeedbackNotFound,

    #[error("Invalid status")]
    InvalidStatus,

    #[error("{0}")]
    InvalidAmount(&'static str),

    #[error("Amount must equal the project price")]
    PriceMismatch,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketError::ProjectNotFound
            | MarketError::BuyerNotFound
            | MarketError::PlatformAccountNotFound
            | MarketError::OwnerNotFound
            | MarketError::TransactionNotFound
            | MarketError::FeedbackNotFound => ErrorKind::NotFound,
            MarketError::InsufficientFunds => ErrorKind::PaymentRequired,
            MarketError::InvalidStatus
            | MarketError::InvalidAmount(_)
            | MarketError::PriceMismatch
            | MarketError::Validation(_) => ErrorKind::BadRequest,
            MarketError::Forbidden(_) => ErrorKind::Forbidden,
            MarketError::Database(_) | MarketError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            MarketError::InsufficientFunds => AppError::payment_required(self.to_string())
                .with_action("Top up your wallet and try again"),
            MarketError::InvalidStatus => AppError::bad_request(self.to_string())
                .with_action("Status must be successful or failed"),
            // 内部詳細はクライアントに返さない
            MarketError::Database(_) | MarketError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            MarketError::Database(e) => {
                tracing::error!(error = %e, "Market database error");
            }
            MarketError::Internal(msg) => {
                tracing::error!(message = %msg, "Market internal error");
            }
            MarketError::PlatformAccountNotFound => {
                tracing::error!("Platform account is missing; settlements cannot complete");
            }
            MarketError::InsufficientFunds | MarketError::Forbidden(_) => {
                tracing::warn!(error = %self, "Market request rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Market error");
            }
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<MoneyError> for MarketError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::Overflow => MarketError::Internal(err.to_string()),
            _ => MarketError::Validation(err.to_string()),
        }
    }
}
