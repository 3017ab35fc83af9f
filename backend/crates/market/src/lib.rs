//! Market (Settlement Engine) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Projects, transactions, feedback, commission split, repository traits
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Settlement Model
//! - A purchase debits the buyer, credits the platform account with the
//!   commission and the project owner with the remainder, in one unit of work
//! - Any failure leaves balances and records untouched
//! - A `failed` settlement is recorded without moving value
//! - Source downloads unlock after a successful purchase

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{MarketConfig, MarketConfigError};
pub use error::{MarketError, MarketResult};
pub use infra::{InMemoryMarketStore, PgMarketRepository};
pub use presentation::handlers::MarketStore;
pub use presentation::router::{market_router, market_router_generic};
