//! Transaction Management Use Case
//!
//! Reads and administrative edits of settlement records. Nothing here moves
//! balances.

use std::sync::Arc;

use auth::AuthenticatedAccount;
use kernel::id::TransactionId;

use crate::domain::entities::Transaction;
use crate::domain::repository::TransactionRepository;
use crate::domain::value_objects::TransactionStatus;
use crate::error::{MarketError, MarketResult};

/// Transaction management use case
pub struct ManageTransactionsUseCase<T>
where
    T: TransactionRepository,
{
    transaction_repo: Arc<T>,
}

impl<T> ManageTransactionsUseCase<T>
where
    T: TransactionRepository,
{
    pub fn new(transaction_repo: Arc<T>) -> Self {
        Self { transaction_repo }
    }

    pub async fn list(&self) -> MarketResult<Vec<Transaction>> {
        self.transaction_repo.list_transactions().await
    }

    /// Admins see any record; buyers see their own
    pub async fn get(
        &self,
        transaction_id: &TransactionId,
        caller: &AuthenticatedAccount,
    ) -> MarketResult<Transaction> {
        let transaction = self
            .transaction_repo
            .find_transaction(transaction_id)
            .await?
            .ok_or(MarketError::TransactionNotFound)?;

        if !caller.is_admin() && transaction.buyer_id != caller.account_id {
            return Err(MarketError::Forbidden("You can only view your own transactions"));
        }

        Ok(transaction)
    }

    pub async fn update_status(
        &self,
        transaction_id: &TransactionId,
        status: &str,
    ) -> MarketResult<Transaction> {
        let status: TransactionStatus = status.parse()?;

        let updated = self
            .transaction_repo
            .update_transaction_status(transaction_id, status)
            .await?
            .ok_or(MarketError::TransactionNotFound)?;

        tracing::info!(
            transaction_id = %transaction_id,
            status = %status,
            "Transaction status updated"
        );

        Ok(updated)
    }

    pub async fn delete(&self, transaction_id: &TransactionId) -> MarketResult<()> {
        if !self.transaction_repo.delete_transaction(transaction_id).await? {
            return Err(MarketError::TransactionNotFound);
        }

        tracing::info!(transaction_id = %transaction_id, "Transaction deleted");

        Ok(())
    }
}
