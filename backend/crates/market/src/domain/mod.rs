//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Project, Transaction, Feedback)
//! - Domain value objects (TransactionStatus, Rating, Screenshots)
//! - Domain services (commission split)
//! - Repository traits (interfaces), including the settlement ledger

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
