//! Repository Traits

use kernel::id::AccountId;

use crate::domain::entity::account::Account;
use crate::domain::value_object::{
    email::Email, password::UserPassword, session_marker::SessionMarker,
};
use crate::error::AuthResult;

#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Insert a new account. A duplicate email yields `AuthError::EmailTaken`.
    async fn create(&self, account: &Account) -> AuthResult<()>;

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn list(&self) -> AuthResult<Vec<Account>>;

    /// Persist name, email, role and password hash. Never writes the wallet
    /// balance or the session marker. Returns false if the account is gone.
    async fn update(&self, account: &Account) -> AuthResult<bool>;

    /// Replace the session marker only if it still equals `expected`.
    /// Returns false when another request changed it first (or the account
    /// no longer exists).
    async fn compare_and_set_session(
        &self,
        account_id: &AccountId,
        expected: &SessionMarker,
        next: &SessionMarker,
    ) -> AuthResult<bool>;

    /// Swap the password hash only if it still equals `expected`, ending any
    /// live session in the same write. Returns false when the hash already
    /// changed (or the account no longer exists).
    async fn replace_password(
        &self,
        account_id: &AccountId,
        expected: &UserPassword,
        next: &UserPassword,
    ) -> AuthResult<bool>;

    /// Unconditionally clear the session marker. Returns false if the
    /// account does not exist.
    async fn clear_session(&self, account_id: &AccountId) -> AuthResult<bool>;

    async fn delete(&self, account_id: &AccountId) -> AuthResult<bool>;
}
