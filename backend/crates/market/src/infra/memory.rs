//! In-Memory Market Store
//!
//! Used by tests and local runs without a database. Wallets are keyed by
//! account id; an account without a wallet entry does not exist.

use std::collections::HashMap;
use std::sync::Arc;

use kernel::id::{AccountId, FeedbackId, ProjectId, TransactionId};
use kernel::money::Money;
use tokio::sync::Mutex;

use crate::domain::entities::{Feedback, Project, Transaction};
use crate::domain::repository::{
    FeedbackRepository, ProjectRepository, SettlementLedger, TransactionRepository,
};
use crate::domain::value_objects::TransactionStatus;
use crate::error::{MarketError, MarketResult};

#[derive(Clone, Default)]
struct MarketState {
    projects: HashMap<ProjectId, Project>,
    transactions: HashMap<TransactionId, Transaction>,
    feedback: HashMap<FeedbackId, Feedback>,
    wallets: HashMap<AccountId, Money>,
}

#[derive(Clone, Default)]
pub struct InMemoryMarketStore {
    state: Arc<Mutex<MarketState>>,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or overwrite) an account wallet
    pub async fn set_balance(&self, account_id: AccountId, balance: Money) {
        self.state.lock().await.wallets.insert(account_id, balance);
    }

    pub async fn balance(&self, account_id: &AccountId) -> Option<Money> {
        self.state.lock().await.wallets.get(account_id).copied()
    }

    pub async fn transaction_count(&self) -> usize {
        self.state.lock().await.transactions.len()
    }
}

fn newest_first<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    items
}

impl ProjectRepository for InMemoryMarketStore {
    async fn create_project(&self, project: &Project) -> MarketResult<()> {
        self.state
            .lock()
            .await
            .projects
            .insert(project.project_id, project.clone());
        Ok(())
    }

    async fn find_project(&self, project_id: &ProjectId) -> MarketResult<Option<Project>> {
        Ok(self.state.lock().await.projects.get(project_id).cloned())
    }

    async fn list_projects(&self) -> MarketResult<Vec<Project>> {
        let projects: Vec<Project> = self.state.lock().await.projects.values().cloned().collect();
        Ok(newest_first(projects, |p| p.created_at))
    }

    async fn list_projects_by_owner(&self, owner_id: &AccountId) -> MarketResult<Vec<Project>> {
        let projects: Vec<Project> = self
            .state
            .lock()
            .await
            .projects
            .values()
            .filter(|p| &p.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(projects, |p| p.created_at))
    }

    async fn list_purchased_projects(&self, buyer_id: &AccountId) -> MarketResult<Vec<Project>> {
        let state = self.state.lock().await;
        let projects: Vec<Project> = state
            .projects
            .values()
            .filter(|p| {
                state.transactions.values().any(|t| {
                    &t.buyer_id == buyer_id
                        && t.project_id == p.project_id
                        && t.status.is_successful()
                })
            })
            .cloned()
            .collect();
        Ok(newest_first(projects, |p| p.created_at))
    }
}

impl TransactionRepository for InMemoryMarketStore {
    async fn find_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> MarketResult<Option<Transaction>> {
        Ok(self.state.lock().await.transactions.get(transaction_id).cloned())
    }

    async fn list_transactions(&self) -> MarketResult<Vec<Transaction>> {
        let transactions: Vec<Transaction> = self.state.lock().await.transactions.values().cloned().collect();
        Ok(newest_first(transactions, |t| t.created_at))
    }

    async fn update_transaction_status(
        &self,
        transaction_id: &TransactionId,
        status: TransactionStatus,
    ) -> MarketResult<Option<Transaction>> {
        let mut state = self.state.lock().await;
        Ok(state.transactions.get_mut(transaction_id).map(|t| {
            t.status = status;
            t.clone()
        }))
    }

    async fn delete_transaction(&self, transaction_id: &TransactionId) -> MarketResult<bool> {
        Ok(self
            .state
            .lock()
            .await
            .transactions
            .remove(transaction_id)
            .is_some())
    }

    async fn has_successful_purchase(
        &self,
        buyer_id: &AccountId,
        project_id: &ProjectId,
    ) -> MarketResult<bool> {
        Ok(self.state.lock().await.transactions.values().any(|t| {
            &t.buyer_id == buyer_id && &t.project_id == project_id && t.status.is_successful()
        }))
    }
}

impl FeedbackRepository for InMemoryMarketStore {
    async fn create_feedback(&self, feedback: &Feedback) -> MarketResult<()> {
        self.state
            .lock()
            .await
            .feedback
            .insert(feedback.feedback_id, feedback.clone());
        Ok(())
    }

    async fn find_feedback(&self, feedback_id: &FeedbackId) -> MarketResult<Option<Feedback>> {
        Ok(self.state.lock().await.feedback.get(feedback_id).cloned())
    }

    async fn list_feedback_by_project(&self, project_id: &ProjectId) -> MarketResult<Vec<Feedback>> {
        let mut feedback: Vec<Feedback> = self
            .state
            .lock()
            .await
            .feedback
            .values()
            .filter(|f| &f.project_id == project_id)
            .cloned()
            .collect();
        feedback.sort_by_key(|f| f.created_at);
        Ok(feedback)
    }

    async fn update_feedback(&self, feedback: &Feedback) -> MarketResult<bool> {
        let mut state = self.state.lock().await;
        let Some(stored) = state.feedback.get_mut(&feedback.feedback_id) else {
            return Ok(false);
        };
        stored.rating = feedback.rating;
        stored.comment = feedback.comment.clone();
        stored.updated_at = feedback.updated_at;
        Ok(true)
    }

    async fn delete_feedback(&self, feedback_id: &FeedbackId) -> MarketResult<bool> {
        Ok(self.state.lock().await.feedback.remove(feedback_id).is_some())
    }
}

impl SettlementLedger for InMemoryMarketStore {
    async fn settle(
        &self,
        transaction: &Transaction,
        platform_account_id: &AccountId,
    ) -> MarketResult<Transaction> {
        let mut state = self.state.lock().await;

        // Work on a copy; it replaces the live state only if every step passes
        let mut staged = state.clone();

        let owner_id = staged
            .projects
            .get(&transaction.project_id)
            .map(|p| p.owner_id)
            .ok_or(MarketError::ProjectNotFound)?;

        let buyer_balance = staged
            .wallets
            .get_mut(&transaction.buyer_id)
            .ok_or(MarketError::BuyerNotFound)?;
        if *buyer_balance < transaction.amount {
            return Err(MarketError::InsufficientFunds);
        }

        if transaction.status.is_successful() {
            *buyer_balance = buyer_balance.checked_sub(transaction.amount)?;
        }

        staged
            .transactions
            .insert(transaction.transaction_id, transaction.clone());

        if transaction.status.is_successful() {
            let platform = staged
                .wallets
                .get_mut(platform_account_id)
                .ok_or(MarketError::PlatformAccountNotFound)?;
            *platform = platform.checked_add(transaction.commission)?;

            let owner = staged
                .wallets
                .get_mut(&owner_id)
                .ok_or(MarketError::OwnerNotFound)?;
            *owner = owner.checked_add(transaction.owner_share())?;

            if let Some(project) = staged.projects.get_mut(&transaction.project_id) {
                project.purchase_count += 1;
            }
        }

        *state = staged;

        Ok(transaction.clone())
    }
}
