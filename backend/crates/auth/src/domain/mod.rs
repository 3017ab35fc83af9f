//! Domain Layer
//!
//! Entities, value objects and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

pub use entity::account::{Account, AccountView};
pub use entity::credential::{AuthenticatedAccount, CredentialPair};
pub use repository::AccountRepository;
