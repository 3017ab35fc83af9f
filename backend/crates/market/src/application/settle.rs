//! Settle Use Case
//!
//! Records a purchase and moves money between buyer, owner and platform.

use std::sync::Arc;

use kernel::id::{AccountId, ProjectId};
use kernel::money::Money;

use crate::application::config::MarketConfig;
use crate::domain::entities::Transaction;
use crate::domain::repository::{ProjectRepository, SettlementLedger};
use crate::domain::services::{CommissionSplit, resolve_commission};
use crate::domain::value_objects::TransactionStatus;
use crate::error::{MarketError, MarketResult};

/// Input DTO for settle
#[derive(Debug, Clone)]
pub struct SettleInput {
    pub project_id: ProjectId,
    pub buyer_id: AccountId,
    pub amount: Money,
    /// Derived from the configured rate when absent
    pub commission: Option<Money>,
    pub status: TransactionStatus,
}

/// Settle Use Case
pub struct SettleUseCase<P, L>
where
    P: ProjectRepository,
    L: SettlementLedger,
{
    project_repo: Arc<P>,
    ledger: Arc<L>,
    config: Arc<MarketConfig>,
}

impl<P, L> SettleUseCase<P, L>
where
    P: ProjectRepository,
    L: SettlementLedger,
{
    pub fn new(project_repo: Arc<P>, ledger: Arc<L>, config: Arc<MarketConfig>) -> Self {
        Self {
            project_repo,
            ledger,
            config,
        }
    }

    pub async fn execute(&self, input: SettleInput) -> MarketResult<Transaction> {
        let project = self
            .project_repo
            .find_project(&input.project_id)
            .await?
            .ok_or(MarketError::ProjectNotFound)?;

        if self.config.require_list_price && input.amount != project.price {
            return Err(MarketError::PriceMismatch);
        }

        let commission =
            resolve_commission(input.amount, input.commission, self.config.commission_rate_bps);
        let split = CommissionSplit::new(input.amount, commission)?;

        let transaction = Transaction::new(project.project_id, input.buyer_id, split, input.status);
        let settled = self
            .ledger
            .settle(&transaction, &self.config.platform_account_id)
            .await?;

        tracing::info!(
            transaction_id = %settled.transaction_id,
            project_id = %settled.project_id,
            buyer_id = %settled.buyer_id,
            amount = %settled.amount,
            commission = %settled.commission,
            status = %settled.status,
            "Purchase settled"
        );

        Ok(settled)
    }
}
