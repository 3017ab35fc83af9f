//! In-Memory Repository Implementations
//!
//! Used by tests and local runs without a database. Same contract as the
//! PostgreSQL repository, including email uniqueness and the session and password
//! compare-and-set writes.

use std::collections::HashMap;
use std::sync::Arc;

use kernel::id::AccountId;
use tokio::sync::RwLock;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    email::Email, password::UserPassword, session_marker::SessionMarker,
};
use crate::error::{AuthError, AuthResult};

#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a stored account wholesale, wallet balance included
    pub async fn put(&self, account: Account) {
        self.accounts.write().await.insert(account.account_id, account);
    }

    pub async fn get(&self, account_id: &AccountId) -> Option<Account> {
        self.accounts.read().await.get(account_id).cloned()
    }
}

impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(AuthError::EmailTaken);
        }
        accounts.insert(account.account_id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self.accounts.read().await.get(account_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| &a.email == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.accounts.read().await.values().any(|a| &a.email == email))
    }

    async fn list(&self) -> AuthResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self.accounts.read().await.values().cloned().collect();
        accounts.sort_by_key(|a| a.created_at);
        Ok(accounts)
    }

    async fn update(&self, account: &Account) -> AuthResult<bool> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.account_id != account.account_id && a.email == account.email)
        {
            return Err(AuthError::EmailTaken);
        }
        let Some(stored) = accounts.get_mut(&account.account_id) else {
            return Ok(false);
        };
        stored.name = account.name.clone();
        stored.email = account.email.clone();
        stored.password = account.password.clone();
        stored.role = account.role;
        stored.updated_at = account.updated_at;
        Ok(true)
    }

    async fn compare_and_set_session(
        &self,
        account_id: &AccountId,
        expected: &SessionMarker,
        next: &SessionMarker,
    ) -> AuthResult<bool> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(account_id) {
            Some(stored) if &stored.session == expected => {
                stored.session = next.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn replace_password(
        &self,
        account_id: &AccountId,
        expected: &UserPassword,
        next: &UserPassword,
    ) -> AuthResult<bool> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(account_id) {
            Some(stored) if &stored.password == expected => {
                stored.change_password(next.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn clear_session(&self, account_id: &AccountId) -> AuthResult<bool> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(account_id) {
            Some(stored) => {
                stored.session = SessionMarker::None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, account_id: &AccountId) -> AuthResult<bool> {
        Ok(self.accounts.write().await.remove(account_id).is_some())
    }
}
