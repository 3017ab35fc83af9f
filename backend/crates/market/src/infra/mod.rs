//! Infrastructure Layer
//!
//! Repository implementations.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryMarketStore;
pub use postgres::PgMarketRepository;
