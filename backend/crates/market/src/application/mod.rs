//! Application Layer - Use cases

pub mod config;
pub mod feedback;
pub mod projects;
pub mod settle;
pub mod transactions;

pub use config::{MarketConfig, MarketConfigError};
pub use feedback::FeedbackUseCase;
pub use projects::{AddProjectInput, ProjectCatalogUseCase};
pub use settle::{SettleInput, SettleUseCase};
pub use transactions::ManageTransactionsUseCase;
