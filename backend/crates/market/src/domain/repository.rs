//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Method names carry their entity so one store can implement every trait.

use kernel::id::{AccountId, FeedbackId, ProjectId, TransactionId};

use crate::domain::entities::{Feedback, Project, Transaction};
use crate::domain::value_objects::TransactionStatus;
use crate::error::MarketResult;

/// Project repository trait
#[trait_variant::make(ProjectRepository: Send)]
pub trait LocalProjectRepository {
    async fn create_project(&self, project: &Project) -> MarketResult<()>;

    async fn find_project(&self, project_id: &ProjectId) -> MarketResult<Option<Project>>;

    /// Newest first
    async fn list_projects(&self) -> MarketResult<Vec<Project>>;

    async fn list_projects_by_owner(&self, owner_id: &AccountId) -> MarketResult<Vec<Project>>;

    /// Projects the buyer holds at least one successful transaction for
    async fn list_purchased_projects(&self, buyer_id: &AccountId) -> MarketResult<Vec<Project>>;
}

/// Transaction repository trait (records only; balances move through the ledger)
#[trait_variant::make(TransactionRepository: Send)]
pub trait LocalTransactionRepository {
    async fn find_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> MarketResult<Option<Transaction>>;

    /// Newest first
    async fn list_transactions(&self) -> MarketResult<Vec<Transaction>>;

    /// Change the recorded status only. Returns the updated record, or None
    /// if it does not exist.
    async fn update_transaction_status(
        &self,
        transaction_id: &TransactionId,
        status: TransactionStatus,
    ) -> MarketResult<Option<Transaction>>;

    async fn delete_transaction(&self, transaction_id: &TransactionId) -> MarketResult<bool>;

    async fn has_successful_purchase(
        &self,
        buyer_id: &AccountId,
        project_id: &ProjectId,
    ) -> MarketResult<bool>;
}

/// Feedback repository trait
#[trait_variant::make(FeedbackRepository: Send)]
pub trait LocalFeedbackRepository {
    async fn create_feedback(&self, feedback: &Feedback) -> MarketResult<()>;

    async fn find_feedback(&self, feedback_id: &FeedbackId) -> MarketResult<Option<Feedback>>;

    /// Oldest first
    async fn list_feedback_by_project(&self, project_id: &ProjectId) -> MarketResult<Vec<Feedback>>;

    async fn update_feedback(&self, feedback: &Feedback) -> MarketResult<bool>;

    async fn delete_feedback(&self, feedback_id: &FeedbackId) -> MarketResult<bool>;
}

/// Settlement ledger
///
/// `settle` runs as one all-or-nothing unit of work:
/// 1. project must exist (`ProjectNotFound`), its owner is read under lock
/// 2. buyer must exist (`BuyerNotFound`) and hold `amount` (`InsufficientFunds`)
/// 3. a successful settlement debits the buyer by `amount`
/// 4. the transaction record is persisted
/// 5. a successful settlement credits the platform account with the
///    commission (`PlatformAccountNotFound`), the owner with the remainder
///    (`OwnerNotFound`) and increments the project's purchase count
///
/// A failed settlement stops after step 4. Any error leaves no write behind.
#[trait_variant::make(SettlementLedger: Send)]
pub trait LocalSettlementLedger {
    async fn settle(
        &self,
        transaction: &Transaction,
        platform_account_id: &AccountId,
    ) -> MarketResult<Transaction>;
}
