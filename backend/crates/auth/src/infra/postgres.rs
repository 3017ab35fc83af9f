//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::{is_foreign_key_violation, is_unique_violation};
use kernel::id::AccountId;
use kernel::money::Money;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_role::AccountRole, display_name::DisplayName, email::Email, password::UserPassword,
    session_marker::SessionMarker,
};
use crate::error::{AuthError, AuthResult};

const ACCOUNT_COLUMNS: &str = r#"
    account_id,
    name,
    email,
    password_hash,
    role,
    wallet_balance,
    refresh_token,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                name,
                email,
                password_hash,
                role,
                wallet_balance,
                refresh_token,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.name.as_str())
        .bind(account.email.as_str())
        .bind(account.password.as_str())
        .bind(account.role.id())
        .bind(account.wallet_balance.amount())
        .bind(account.session.as_db())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = $1"
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    async fn list(&self) -> AuthResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AccountRow::into_account).collect()
    }

    async fn update(&self, account: &Account) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                name = $2,
                email = $3,
                password_hash = $4,
                role = $5,
                updated_at = $6
            WHERE account_id = $1
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.name.as_str())
        .bind(account.email.as_str())
        .bind(account.password.as_str())
        .bind(account.role.id())
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(result.rows_affected() > 0)
    }

    async fn compare_and_set_session(
        &self,
        account_id: &AccountId,
        expected: &SessionMarker,
        next: &SessionMarker,
    ) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_token = $3, updated_at = NOW()
            WHERE account_id = $1 AND refresh_token IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(expected.as_db())
        .bind(next.as_db())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn replace_password(
        &self,
        account_id: &AccountId,
        expected: &UserPassword,
        next: &UserPassword,
    ) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $3, refresh_token = NULL, updated_at = NOW()
            WHERE account_id = $1 AND password_hash = $2
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(expected.as_str())
        .bind(next.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn clear_session(&self, account_id: &AccountId) -> AuthResult<bool> {
        let result = sqlx::query(
            "UPDATE accounts SET refresh_token = NULL, updated_at = NOW() WHERE account_id = $1",
        )
        .bind(account_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, account_id: &AccountId) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Listings and transactions restrict account deletion
fn map_delete_error(e: sqlx::Error) -> AuthError {
    if is_foreign_key_violation(&e) {
        AuthError::AccountInUse
    } else {
        AuthError::Database(e)
    }
}

fn map_unique_violation(e: sqlx::Error) -> AuthError {
    if is_unique_violation(&e) {
        AuthError::EmailTaken
    } else {
        AuthError::Database(e)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: i16,
    wallet_balance: Decimal,
    refresh_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let password = UserPassword::from_db(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password_hash: {e}")))?;
        let role = AccountRole::from_id(self.role)
            .map_err(|e| AuthError::Internal(format!("Invalid role: {e}")))?;
        let wallet_balance = Money::new(self.wallet_balance)
            .map_err(|e| AuthError::Internal(format!("Invalid wallet_balance: {e}")))?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            name: DisplayName::from_db(self.name),
            email: Email::from_db(self.email),
            password,
            role,
            wallet_balance,
            session: SessionMarker::from_db(self.refresh_token),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
