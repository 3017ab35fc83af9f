//! Sign Out Use Case
//!
//! Clears the session marker. Outstanding access credentials stay valid
//! until they expire; the refresh credential stops working at once.

use std::sync::Arc;

use kernel::id::AccountId;

use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};

/// Sign out use case
pub struct SignOutUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
}

impl<A> SignOutUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>) -> Self {
        Self { account_repo }
    }

    pub async fn execute(&self, account_id: &AccountId) -> AuthResult<()> {
        if !self.account_repo.clear_session(account_id).await? {
            return Err(AuthError::AccountNotFound);
        }

        tracing::info!(account_id = %account_id, "Account signed out");

        Ok(())
    }
}
