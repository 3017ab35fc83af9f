//! Account Management Use Case
//!
//! Profile reads and edits for the caller, directory operations for admins.

use std::sync::Arc;

use kernel::id::AccountId;

use crate::domain::entity::account::AccountView;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_role::AccountRole, display_name::DisplayName, email::Email,
};
use crate::error::{AuthError, AuthResult};

/// Profile update input (absent fields are left unchanged)
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Account management use case
pub struct ManageAccountUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
}

impl<A> ManageAccountUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>) -> Self {
        Self { account_repo }
    }

    pub async fn get(&self, account_id: &AccountId) -> AuthResult<AccountView> {
        self.account_repo
            .find_by_id(account_id)
            .await?
            .map(|account| account.view())
            .ok_or(AuthError::AccountNotFound)
    }

    pub async fn find_by_email(&self, email: String) -> AuthResult<AccountView> {
        let email = Email::new(email).map_err(|_| AuthError::AccountNotFound)?;
        self.account_repo
            .find_by_email(&email)
            .await?
            .map(|account| account.view())
            .ok_or(AuthError::AccountNotFound)
    }

    pub async fn list(&self) -> AuthResult<Vec<AccountView>> {
        let accounts = self.account_repo.list().await?;
        Ok(accounts.iter().map(|account| account.view()).collect())
    }

    pub async fn update_profile(
        &self,
        account_id: &AccountId,
        input: UpdateProfileInput,
    ) -> AuthResult<AccountView> {
        let mut account = self
            .account_repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if let Some(name) = input.name {
            account.rename(DisplayName::new(name)?);
        }
        if let Some(email) = input.email {
            let email = Email::new(email)?;
            if email != account.email {
                if self.account_repo.exists_by_email(&email).await? {
                    return Err(AuthError::EmailTaken);
                }
                account.change_email(email);
            }
        }

        if !self.account_repo.update(&account).await? {
            return Err(AuthError::AccountNotFound);
        }

        tracing::info!(account_id = %account_id, "Account profile updated");

        Ok(account.view())
    }

    /// ロール変更は次回のトークン発行から反映される
    pub async fn change_role(
        &self,
        account_id: &AccountId,
        role: AccountRole,
    ) -> AuthResult<AccountView> {
        let mut account = self
            .account_repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        account.change_role(role);
        if !self.account_repo.update(&account).await? {
            return Err(AuthError::AccountNotFound);
        }

        tracing::info!(account_id = %account_id, role = %role, "Account role changed");

        Ok(account.view())
    }

    pub async fn delete(&self, account_id: &AccountId) -> AuthResult<()> {
        if !self.account_repo.delete(account_id).await? {
            return Err(AuthError::AccountNotFound);
        }

        tracing::info!(account_id = %account_id, "Account deleted");

        Ok(())
    }
}
